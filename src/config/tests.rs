//! Tests for config functionality.

use crate::config::{Config, normalize_level};
use crate::error::VpnBlockError;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;

fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.mgmt_host, "127.0.0.1");
    assert_eq!(config.mgmt_port, 17898);
    assert_eq!(config.mgmt_timeout(), Duration::from_secs(5));
    assert_eq!(
        config.blocklist,
        PathBuf::from("/etc/openvpn/client/blocklist")
    );
    assert_eq!(config.wg_interface, "wg0");
    assert!(!config.wg_as_sudo);
    assert_eq!(config.wg_bin, "/usr/bin/wg");
    assert_eq!(config.wg_quick_bin, "/usr/bin/wg-quick");
    assert_eq!(config.wg_timeout(), Duration::from_secs(50));
    assert_eq!(
        config.log_file,
        Some(PathBuf::from("/etc/openvpn/client/blocker/blocker.log"))
    );
    assert_eq!(config.log_level, "info");
    config.validate().unwrap();
}

#[test]
fn test_parse_empty_yaml() {
    let config = Config::from_yaml("").unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
mgmt_port: 7505
blocklist: /var/lib/vpnblock/blocklist
log_file: null
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.mgmt_port, 7505);
    assert_eq!(config.blocklist, PathBuf::from("/var/lib/vpnblock/blocklist"));
    assert_eq!(config.log_file, None);

    // Unspecified values should use defaults
    assert_eq!(config.mgmt_host, "127.0.0.1");
    assert_eq!(config.wg_interface, "wg0");
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = "future_option: 42\nwg_interface: wg7\n";
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.wg_interface, "wg7");
}

#[test]
fn test_invalid_yaml_is_user_error() {
    let err = Config::from_yaml("mgmt_port: [not a port]").unwrap_err();
    assert!(matches!(err, VpnBlockError::UserError(_)));
}

#[test]
fn test_yaml_round_trip() {
    let mut config = Config::default();
    config.wg_as_sudo = true;
    config.log_file = None;

    let parsed = Config::from_yaml(&config.to_yaml().unwrap()).unwrap();

    assert_eq!(parsed, config);
}

#[test]
fn test_load_from_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("vpnblock.yaml");
    std::fs::write(&path, "mgmt_host: 10.8.0.1\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert_eq!(config.mgmt_host, "10.8.0.1");
}

#[test]
fn test_load_missing_file_is_user_error() {
    let err = Config::load("/nonexistent/vpnblock.yaml").unwrap_err();
    assert!(err.to_string().contains("failed to read config file"));
}

#[test]
fn test_env_overrides_every_field() {
    let mut config = Config::default();

    config
        .apply_env(env(&[
            ("OVPN_MGMT_HOST", "10.0.0.1"),
            ("OVPN_MGMT_PORT", "7505"),
            ("OVPN_BLOCKLIST", "/tmp/blocklist"),
            ("WG_INT_NAME", "wg9"),
            ("WG_AS_SUDO", "yes"),
            ("WG_BIN_PATH", "/opt/wg"),
            ("WG_QUICK_PATH", "/opt/wg-quick"),
            ("BLOCKER_LOG_FILE", "/tmp/blocker.log"),
            ("BLOCKER_LOG_LEVEL", "debug"),
        ]))
        .unwrap();

    assert_eq!(config.mgmt_host, "10.0.0.1");
    assert_eq!(config.mgmt_port, 7505);
    assert_eq!(config.blocklist, PathBuf::from("/tmp/blocklist"));
    assert_eq!(config.wg_interface, "wg9");
    assert!(config.wg_as_sudo);
    assert_eq!(config.wg_bin, "/opt/wg");
    assert_eq!(config.wg_quick_bin, "/opt/wg-quick");
    assert_eq!(config.log_file, Some(PathBuf::from("/tmp/blocker.log")));
    assert_eq!(config.log_level, "debug");
}

#[test]
fn test_env_absent_keeps_values() {
    let mut config = Config::default();
    config.apply_env(env(&[])).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_empty_log_file_env_disables_file_logging() {
    let mut config = Config::default();
    config.apply_env(env(&[("BLOCKER_LOG_FILE", "")])).unwrap();
    assert_eq!(config.log_file, None);
}

#[test]
fn test_wg_as_sudo_parsing() {
    for (value, expected) in [("1", true), ("TRUE", true), ("off", false), ("", false)] {
        let mut config = Config::default();
        config.apply_env(env(&[("WG_AS_SUDO", value)])).unwrap();
        assert_eq!(config.wg_as_sudo, expected, "{value:?}");
    }

    let mut config = Config::default();
    assert!(config.apply_env(env(&[("WG_AS_SUDO", "maybe")])).is_err());
}

#[test]
fn test_bad_port_env_is_user_error() {
    let mut config = Config::default();
    let err = config
        .apply_env(env(&[("OVPN_MGMT_PORT", "seventeen")]))
        .unwrap_err();
    assert!(err.to_string().contains("OVPN_MGMT_PORT"));
}

#[test]
fn test_validate_rejects_bad_values() {
    let cases: Vec<fn(&mut Config)> = vec![
        |c: &mut Config| c.mgmt_host = " ".to_string(),
        |c: &mut Config| c.mgmt_port = 0,
        |c: &mut Config| c.mgmt_timeout_secs = 0,
        |c: &mut Config| c.blocklist = PathBuf::new(),
        |c: &mut Config| c.wg_interface = String::new(),
        |c: &mut Config| c.wg_bin = String::new(),
        |c: &mut Config| c.wg_timeout_secs = 0,
        |c: &mut Config| c.log_level = "loud".to_string(),
    ];

    for mutate in cases {
        let mut config = Config::default();
        mutate(&mut config);
        let err = config.validate().unwrap_err();
        assert!(
            err.to_string().starts_with("config validation failed"),
            "{err}"
        );
    }
}

#[test]
fn test_normalize_level() {
    assert_eq!(normalize_level("INFO").unwrap(), "info");
    assert_eq!(normalize_level(" warning ").unwrap(), "warn");
    assert!(normalize_level("verbose").is_err());
}
