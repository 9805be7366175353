//! Config struct definition and default implementation.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for vpnblock.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // OpenVPN settings
    // =========================================================================
    /// Management interface host.
    pub mgmt_host: String,

    /// Management interface port.
    pub mgmt_port: u16,

    /// Deadline for one management conversation, in seconds.
    pub mgmt_timeout_secs: u64,

    /// Blocklist file consulted by the server on connect.
    pub blocklist: PathBuf,

    // =========================================================================
    // WireGuard settings
    // =========================================================================
    /// Interface the peers live on.
    pub wg_interface: String,

    /// Prefix `wg` and `wg-quick` with `sudo`.
    pub wg_as_sudo: bool,

    /// `wg` command, split like a shell would.
    pub wg_bin: String,

    /// `wg-quick` command, split like a shell would.
    pub wg_quick_bin: String,

    /// Deadline for each `wg`/`wg-quick` invocation, in seconds.
    pub wg_timeout_secs: u64,

    // =========================================================================
    // Logging settings
    // =========================================================================
    /// Rotating log file. `None` (or an empty value) logs to stderr only.
    pub log_file: Option<PathBuf>,

    /// Level for stderr output (trace|debug|info|warn|error).
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            mgmt_host: "127.0.0.1".to_string(),
            mgmt_port: 17898,
            mgmt_timeout_secs: 5,
            blocklist: PathBuf::from("/etc/openvpn/client/blocklist"),
            wg_interface: "wg0".to_string(),
            wg_as_sudo: false,
            wg_bin: "/usr/bin/wg".to_string(),
            wg_quick_bin: "/usr/bin/wg-quick".to_string(),
            wg_timeout_secs: 50,
            log_file: Some(PathBuf::from("/etc/openvpn/client/blocker/blocker.log")),
            log_level: "info".to_string(),
        }
    }
}
