//! Implementation of the `vpnblock wg` commands.

use crate::acl::WireguardAcl;
use crate::blocker::{PublicKey, WgBlockOutcome, WireguardBlocker};
use crate::cli::{WgAction, WgCommand};
use crate::config::Config;
use crate::error::Result;

pub fn run(cmd: WgCommand, config: &Config) -> Result<()> {
    // `--interface` has already been folded into `config`.
    let acl = WireguardAcl::new(
        config.wg_interface.clone(),
        &config.wg_bin,
        &config.wg_quick_bin,
        config.wg_as_sudo,
        config.wg_timeout(),
    )?;
    let blocker = WireguardBlocker::new(acl);

    match cmd.action {
        WgAction::Block(args) => {
            let key = PublicKey::parse(&args.key)?;
            match blocker.block(&key)? {
                WgBlockOutcome::Blocked { previous } => {
                    println!("Blocked {} on {}", key, config.wg_interface);
                    println!("  Previous allowed-ips: {}", previous);
                }
                WgBlockOutcome::AlreadyBlocked => println!("{} was already blocked", key),
            }
        }
        WgAction::Unblock(args) => {
            let key = PublicKey::parse(&args.key)?;
            blocker.unblock(&key, args.ip)?;
            println!("Unblocked {} at {}", key, args.ip);
        }
        WgAction::Show(args) => {
            let key = PublicKey::parse(&args.key)?;
            match blocker.endpoint(&key)? {
                Some(allowed_ips) => println!("{}", allowed_ips),
                None => println!("{} is not configured on {}", key, config.wg_interface),
            }
        }
    }

    Ok(())
}
