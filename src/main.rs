//! vpnblock: block and unblock VPN clients.
//!
//! This is the main entry point for the `vpnblock` CLI. It parses arguments,
//! resolves configuration, starts logging, dispatches to the appropriate
//! command handler, and handles errors with proper exit codes.

mod cli;
mod commands;
pub mod acl;
pub mod blocker;
pub mod config;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod locks;
pub mod logging;
pub mod session;
pub mod store;

use cli::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse_args();

    let config = match commands::load_config(&cli) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("Error: {}", err);
            return ExitCode::from(err.exit_code() as u8);
        }
    };

    // Held until exit so buffered file output is flushed.
    let _logger = match logging::init_logging(&config.log_level, config.log_file.as_deref()) {
        Ok(handle) => Some(handle),
        Err(e) => {
            eprintln!("Warning: logging disabled: {}", e);
            None
        }
    };

    match commands::dispatch(cli.command, &config) {
        Ok(()) => ExitCode::from(exit_codes::SUCCESS as u8),
        Err(err) => {
            log::debug!("command failed: {:?}", err);
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
