//! `wg` / `wg-quick` backed allow-list updates.

use super::AclUpdater;
use super::command::run_command;
use crate::error::{Result, VpnBlockError};
use std::net::IpAddr;
use std::time::Duration;

/// Runs `wg` and `wg-quick` against one interface.
#[derive(Debug, Clone)]
pub struct WireguardAcl {
    interface: String,
    wg: Vec<String>,
    wg_quick: Vec<String>,
    timeout: Duration,
}

impl WireguardAcl {
    /// Build from configured command strings.
    ///
    /// `wg_bin` and `wg_quick_bin` are split like a shell would, so they may
    /// carry their own prefix (`"sudo -n /usr/bin/wg"`). With `sudo` set,
    /// `sudo` is prepended to both.
    pub fn new(
        interface: impl Into<String>,
        wg_bin: &str,
        wg_quick_bin: &str,
        sudo: bool,
        timeout: Duration,
    ) -> Result<Self> {
        let interface = interface.into();
        if interface.is_empty() || interface.contains(char::is_whitespace) {
            return Err(VpnBlockError::UserError(format!(
                "invalid WireGuard interface name {:?}",
                interface
            )));
        }

        Ok(Self {
            interface,
            wg: command_prefix(wg_bin, sudo)?,
            wg_quick: command_prefix(wg_quick_bin, sudo)?,
            timeout,
        })
    }

    fn wg_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.wg.clone();
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }

    fn wg_quick_argv(&self, args: &[&str]) -> Vec<String> {
        let mut argv = self.wg_quick.clone();
        argv.extend(args.iter().map(|a| a.to_string()));
        argv
    }
}

fn command_prefix(configured: &str, sudo: bool) -> Result<Vec<String>> {
    let mut argv = shell_words::split(configured).map_err(|e| {
        VpnBlockError::UserError(format!(
            "failed to parse command '{}': {}\n\
             Fix: check for unmatched quotes or invalid escape sequences.",
            configured, e
        ))
    })?;

    if argv.is_empty() {
        return Err(VpnBlockError::UserError(format!(
            "command is empty after parsing: '{}'",
            configured
        )));
    }

    if sudo {
        argv.insert(0, "sudo".to_string());
    }
    Ok(argv)
}

impl AclUpdater for WireguardAcl {
    fn current_endpoint(&self, identity: &str) -> Result<Option<String>> {
        let output = run_command(
            &self.wg_argv(&["show", &self.interface, "dump"]),
            self.timeout,
        )?;

        let endpoint = parse_dump(&output.stdout, identity);
        if let Some(endpoint) = &endpoint {
            log::info!("Found WG allowedip for client {}: {}", identity, endpoint);
        }
        Ok(endpoint)
    }

    fn set_endpoint(&self, identity: &str, endpoint: IpAddr) -> Result<()> {
        let prefix = if endpoint.is_ipv4() { 32 } else { 128 };
        let allowed_ips = format!("{}/{}", endpoint, prefix);

        let set = run_command(
            &self.wg_argv(&[
                "set",
                &self.interface,
                "peer",
                identity,
                "allowed-ips",
                &allowed_ips,
            ]),
            self.timeout,
        );

        // Save even when set failed so the on-disk config matches the live state.
        let save = run_command(&self.wg_quick_argv(&["save", &self.interface]), self.timeout);

        set?;
        save?;
        Ok(())
    }
}

/// Allowed-ips of peer `key` in `wg show <if> dump` output.
///
/// Peer lines are tab separated: public key, preshared key, endpoint,
/// allowed-ips, ... The interface line (private key first) never matches a
/// peer key. Returns `None` if the peer is missing or its line is short.
pub fn parse_dump(dump: &str, key: &str) -> Option<String> {
    dump.lines()
        .map(|line| line.split_whitespace().collect::<Vec<_>>())
        .find(|cols| cols.first() == Some(&key))
        .and_then(|cols| cols.get(3).map(|c| c.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PEER_A: &str = "6cCLfSYbyPcRODrH3yNuxiaqNZ212345YpzB6LAb3nM=";
    const PEER_B: &str = "xTIBA5rboUvnH4htodjb6e697QjLERt1NAB4mZqp8Dg=";

    fn dump() -> String {
        format!(
            "cHJpdmF0ZWtleXByaXZhdGVrZXlwcml2YXRla2V5cHI=\tcHVibGlj\t51820\toff\n\
             {PEER_A}\t(none)\t198.51.100.7:40022\t10.64.1.7/32\t1700000000\t1024\t2048\toff\n\
             {PEER_B}\t(none)\t(none)\t10.64.1.8/32\t0\t0\t0\toff\n"
        )
    }

    #[test]
    fn parse_dump_finds_peer_allowed_ips() {
        assert_eq!(parse_dump(&dump(), PEER_A).as_deref(), Some("10.64.1.7/32"));
        assert_eq!(parse_dump(&dump(), PEER_B).as_deref(), Some("10.64.1.8/32"));
    }

    #[test]
    fn parse_dump_unknown_peer() {
        assert_eq!(parse_dump(&dump(), "unknown="), None);
    }

    #[test]
    fn parse_dump_short_line() {
        let dump = format!("{PEER_A}\t(none)\t(none)\n");
        assert_eq!(parse_dump(&dump, PEER_A), None);
    }

    #[test]
    fn command_prefix_splits_and_adds_sudo() {
        assert_eq!(
            command_prefix("/usr/bin/wg", false).unwrap(),
            vec!["/usr/bin/wg"]
        );
        assert_eq!(
            command_prefix("/usr/bin/wg", true).unwrap(),
            vec!["sudo", "/usr/bin/wg"]
        );
        assert_eq!(
            command_prefix("doas '/opt/wire guard/wg'", false).unwrap(),
            vec!["doas", "/opt/wire guard/wg"]
        );
    }

    #[test]
    fn command_prefix_rejects_bad_input() {
        assert!(command_prefix("", false).is_err());
        assert!(command_prefix("'unterminated", false).is_err());
    }

    #[test]
    fn new_rejects_bad_interface() {
        let err = WireguardAcl::new("", "wg", "wg-quick", false, Duration::from_secs(1));
        assert!(matches!(err, Err(VpnBlockError::UserError(_))));
    }

    #[cfg(unix)]
    mod with_fake_wg {
        use super::*;
        use serial_test::serial;
        use std::fs;
        use std::os::unix::fs::PermissionsExt;
        use std::path::Path;
        use tempfile::TempDir;

        /// Write an executable script that records its arguments in `calls`
        /// and then runs `body`.
        fn fake_tool(dir: &Path, name: &str, body: &str) -> String {
            let path = dir.join(name);
            let calls = dir.join("calls");
            fs::write(
                &path,
                format!(
                    "#!/bin/sh\necho \"{name} $*\" >> '{}'\n{body}\n",
                    calls.display()
                ),
            )
            .unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path.to_string_lossy().into_owned()
        }

        fn calls(dir: &Path) -> Vec<String> {
            fs::read_to_string(dir.join("calls"))
                .unwrap_or_default()
                .lines()
                .map(str::to_owned)
                .collect()
        }

        #[test]
        #[serial(spawn)]
        fn set_endpoint_sets_then_saves() {
            let temp = TempDir::new().unwrap();
            let wg = fake_tool(temp.path(), "wg", "exit 0");
            let wg_quick = fake_tool(temp.path(), "wg-quick", "exit 0");
            let acl = WireguardAcl::new("wg0", &wg, &wg_quick, false, Duration::from_secs(5))
                .unwrap();

            acl.set_endpoint(PEER_A, "127.0.0.2".parse().unwrap())
                .unwrap();

            assert_eq!(
                calls(temp.path()),
                vec![
                    format!("wg set wg0 peer {PEER_A} allowed-ips 127.0.0.2/32"),
                    "wg-quick save wg0".to_string(),
                ]
            );
        }

        #[test]
        #[serial(spawn)]
        fn set_endpoint_uses_128_for_ipv6() {
            let temp = TempDir::new().unwrap();
            let wg = fake_tool(temp.path(), "wg", "exit 0");
            let wg_quick = fake_tool(temp.path(), "wg-quick", "exit 0");
            let acl = WireguardAcl::new("wg1", &wg, &wg_quick, false, Duration::from_secs(5))
                .unwrap();

            acl.set_endpoint(PEER_A, "fd00::7".parse().unwrap()).unwrap();

            assert!(calls(temp.path())[0].ends_with("allowed-ips fd00::7/128"));
        }

        #[test]
        #[serial(spawn)]
        fn failed_set_still_saves_and_reports_set_error() {
            let temp = TempDir::new().unwrap();
            let wg = fake_tool(temp.path(), "wg", "echo 'Unable to modify interface' >&2; exit 1");
            let wg_quick = fake_tool(temp.path(), "wg-quick", "exit 0");
            let acl = WireguardAcl::new("wg0", &wg, &wg_quick, false, Duration::from_secs(5))
                .unwrap();

            let err = acl
                .set_endpoint(PEER_A, "127.0.0.2".parse().unwrap())
                .unwrap_err();

            assert!(err.to_string().contains("Unable to modify interface"));
            assert_eq!(calls(temp.path()).len(), 2);
        }

        #[test]
        #[serial(spawn)]
        fn current_endpoint_reads_dump() {
            let temp = TempDir::new().unwrap();
            let body = format!("printf '%s\\n' '{PEER_A} (none) (none) 10.64.1.7/32 0 0 0 off'");
            let wg = fake_tool(temp.path(), "wg", &body);
            let acl =
                WireguardAcl::new("wg0", &wg, "true", false, Duration::from_secs(5)).unwrap();

            assert_eq!(
                acl.current_endpoint(PEER_A).unwrap().as_deref(),
                Some("10.64.1.7/32")
            );
            assert_eq!(acl.current_endpoint(PEER_B).unwrap(), None);
            assert_eq!(calls(temp.path())[0], "wg show wg0 dump");
        }
    }
}
