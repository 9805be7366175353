//! Implementation of the `vpnblock config` commands.

use crate::cli::{ConfigAction, ConfigCommand};
use crate::config::Config;
use crate::error::Result;

pub fn run(cmd: ConfigCommand, config: &Config) -> Result<()> {
    match cmd.action {
        ConfigAction::Show => print!("{}", config.to_yaml()?),
    }
    Ok(())
}
