//! Command implementations for vpnblock.
//!
//! This module resolves the effective configuration and routes CLI commands
//! to their handlers. Handlers print results on stdout; diagnostics go
//! through `log` to stderr and the log file.

mod config_cmd;
mod ovpn;
mod store;
mod wg;

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::error::{Result, VpnBlockError};

/// Dispatch a command to its implementation.
pub fn dispatch(command: Command, config: &Config) -> Result<()> {
    match command {
        Command::Ovpn(cmd) => ovpn::run(cmd, config),
        Command::Wg(cmd) => wg::run(cmd, config),
        Command::Store(cmd) => store::run(cmd, config),
        Command::Config(cmd) => config_cmd::run(cmd, config),
    }
}

/// Resolve the effective configuration.
///
/// Layers, lowest first: built-in defaults, the YAML file from `--config`,
/// environment variables, then command line flags. The result is validated.
pub fn load_config(cli: &Cli) -> Result<Config> {
    load_config_with(cli, |key| std::env::var(key).ok())
}

fn load_config_with<F>(cli: &Cli, lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let mut config = match cli.config.as_deref() {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    config.apply_env(lookup)?;

    if let Some(blocklist) = cli.blocklist.as_deref() {
        config.blocklist = blocklist.to_path_buf();
    }
    if let Some(level) = cli.log_level.as_deref() {
        config.log_level = level.to_string();
    }
    if let Command::Wg(wg) = &cli.command
        && let Some(interface) = wg.interface.as_deref()
    {
        config.wg_interface = interface.to_string();
    }

    config.validate()?;
    Ok(config)
}

/// Print `items` one per line, or as a JSON array.
fn print_list(items: &[String], json: bool) -> Result<()> {
    if json {
        let rendered = serde_json::to_string_pretty(items).map_err(|e| {
            VpnBlockError::UserError(format!("failed to render JSON: {}", e))
        })?;
        println!("{}", rendered);
    } else {
        for item in items {
            println!("{}", item);
        }
    }
    Ok(())
}
