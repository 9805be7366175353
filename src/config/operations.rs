//! Config loading, environment overrides and validation.

use super::model::Config;
use crate::error::{Result, VpnBlockError};
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            VpnBlockError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Option<Config> = serde_yaml::from_str(yaml).map_err(|e| {
            VpnBlockError::UserError(format!("failed to parse config YAML: {}", e))
        })?;
        // An empty document deserializes to None.
        Ok(config.unwrap_or_default())
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            VpnBlockError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Override fields from environment variables read through `lookup`.
    ///
    /// | variable            | field          |
    /// |---------------------|----------------|
    /// | `OVPN_MGMT_HOST`    | `mgmt_host`    |
    /// | `OVPN_MGMT_PORT`    | `mgmt_port`    |
    /// | `OVPN_BLOCKLIST`    | `blocklist`    |
    /// | `WG_INT_NAME`       | `wg_interface` |
    /// | `WG_AS_SUDO`        | `wg_as_sudo`   |
    /// | `WG_BIN_PATH`       | `wg_bin`       |
    /// | `WG_QUICK_PATH`     | `wg_quick_bin` |
    /// | `BLOCKER_LOG_FILE`  | `log_file`     |
    /// | `BLOCKER_LOG_LEVEL` | `log_level`    |
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("OVPN_MGMT_HOST") {
            self.mgmt_host = host;
        }
        if let Some(port) = lookup("OVPN_MGMT_PORT") {
            self.mgmt_port = port.trim().parse::<u16>().map_err(|e| {
                VpnBlockError::UserError(format!("invalid OVPN_MGMT_PORT '{}': {}", port, e))
            })?;
        }
        if let Some(path) = lookup("OVPN_BLOCKLIST") {
            self.blocklist = PathBuf::from(path);
        }
        if let Some(interface) = lookup("WG_INT_NAME") {
            self.wg_interface = interface;
        }
        if let Some(flag) = lookup("WG_AS_SUDO") {
            self.wg_as_sudo = parse_flag("WG_AS_SUDO", &flag)?;
        }
        if let Some(bin) = lookup("WG_BIN_PATH") {
            self.wg_bin = bin;
        }
        if let Some(bin) = lookup("WG_QUICK_PATH") {
            self.wg_quick_bin = bin;
        }
        if let Some(path) = lookup("BLOCKER_LOG_FILE") {
            self.log_file = if path.trim().is_empty() {
                None
            } else {
                Some(PathBuf::from(path))
            };
        }
        if let Some(level) = lookup("BLOCKER_LOG_LEVEL") {
            self.log_level = level;
        }
        Ok(())
    }

    /// Validate config values and return error on invalid values.
    pub fn validate(&self) -> Result<()> {
        if self.mgmt_host.trim().is_empty() {
            return Err(invalid("mgmt_host must not be empty"));
        }
        if self.mgmt_port == 0 {
            return Err(invalid("mgmt_port must be greater than 0"));
        }
        if self.mgmt_timeout_secs == 0 {
            return Err(invalid("mgmt_timeout_secs must be greater than 0"));
        }
        if self.blocklist.as_os_str().is_empty() {
            return Err(invalid("blocklist must not be empty"));
        }
        if self.wg_interface.trim().is_empty() {
            return Err(invalid("wg_interface must not be empty"));
        }
        if self.wg_bin.trim().is_empty() || self.wg_quick_bin.trim().is_empty() {
            return Err(invalid("wg_bin and wg_quick_bin must not be empty"));
        }
        if self.wg_timeout_secs == 0 {
            return Err(invalid("wg_timeout_secs must be greater than 0"));
        }
        normalize_level(&self.log_level).map_err(|e| invalid(&e))?;
        Ok(())
    }

    pub fn mgmt_timeout(&self) -> Duration {
        Duration::from_secs(self.mgmt_timeout_secs)
    }

    pub fn wg_timeout(&self) -> Duration {
        Duration::from_secs(self.wg_timeout_secs)
    }
}

fn invalid(message: &str) -> VpnBlockError {
    VpnBlockError::UserError(format!("config validation failed: {}", message))
}

fn parse_flag(name: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "" | "0" | "false" | "no" | "off" => Ok(false),
        other => Err(VpnBlockError::UserError(format!(
            "invalid {} '{}': expected true or false",
            name, other
        ))),
    }
}

/// Canonical name of a log level.
pub fn normalize_level(level: &str) -> std::result::Result<&'static str, String> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        other => Err(format!(
            "unsupported log level `{other}`; expected trace|debug|info|warn|error"
        )),
    }
}
