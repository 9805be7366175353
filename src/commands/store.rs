//! Implementation of the `vpnblock store` commands.
//!
//! These work on the blocklist file alone: no session is killed and entries
//! are not checked as common names.

use super::print_list;
use crate::cli::{StoreAction, StoreCommand};
use crate::config::Config;
use crate::error::{Result, VpnBlockError};
use crate::store::ListStore;
use std::io::Read;
use std::path::Path;

pub fn run(cmd: StoreCommand, config: &Config) -> Result<()> {
    let store = ListStore::new(config.blocklist.clone())?;

    match cmd.action {
        StoreAction::List(args) => print_list(&store.list()?, args.json)?,
        StoreAction::Contains(args) => println!("{}", store.contains(&args.item)?),
        StoreAction::Add(args) => {
            if store.add(&args.item)? {
                println!("Added {}", args.item);
            } else {
                println!("{} already present", args.item);
            }
        }
        StoreAction::Remove(args) => {
            if store.remove(&args.item)? {
                println!("Removed {}", args.item);
            } else {
                println!("{} not present", args.item);
            }
        }
        StoreAction::Replace(args) => {
            let content = read_source(&args.source)?;
            let items = entries(&content);
            store.replace_all(&items)?;
            println!(
                "Replaced {} ({} lines read)",
                store.path().display(),
                items.len()
            );
        }
    }

    Ok(())
}

/// Read the replacement entries from a file, or stdin for "-".
fn read_source(source: &Path) -> Result<String> {
    if source == Path::new("-") {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(|e| VpnBlockError::io("failed to read entries from stdin", e))?;
        return Ok(content);
    }

    std::fs::read_to_string(source).map_err(|e| {
        VpnBlockError::UserError(format!(
            "failed to read entries from '{}': {}",
            source.display(),
            e
        ))
    })
}

/// One entry per line; empty lines and a trailing `\r` are dropped.
/// Whitespace-only lines are kept, as `store list` prints them.
fn entries(content: &str) -> Vec<&str> {
    content.lines().filter(|line| !line.is_empty()).collect()
}
