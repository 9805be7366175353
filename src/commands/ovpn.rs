//! Implementation of the `vpnblock ovpn` commands.

use super::print_list;
use crate::blocker::{BlockOutcome, CommonName, OpenVpnBlocker, SessionResult, UnblockOutcome};
use crate::cli::{OvpnAction, OvpnCommand};
use crate::config::Config;
use crate::error::Result;
use crate::session::ManagementClient;
use crate::store::ListStore;

pub fn run(cmd: OvpnCommand, config: &Config) -> Result<()> {
    let blocker = open_blocker(config)?;

    match cmd.action {
        OvpnAction::Block(args) => {
            let cn = CommonName::parse(&args.common_name)?;
            let outcome = blocker.block(&cn)?;
            print_block(&cn, &outcome);
        }
        OvpnAction::Unblock(args) => {
            let cn = CommonName::parse(&args.common_name)?;
            match blocker.unblock(&cn)? {
                UnblockOutcome::Unblocked => println!("Unblocked {}", cn),
                UnblockOutcome::NotBlocked => println!("{} was not blocked", cn),
            }
        }
        OvpnAction::List(args) => print_list(&blocker.blocked()?, args.json)?,
    }

    Ok(())
}

fn open_blocker(config: &Config) -> Result<OpenVpnBlocker<ManagementClient>> {
    let store = ListStore::new(config.blocklist.clone())?;
    let client = ManagementClient::new(
        config.mgmt_host.clone(),
        config.mgmt_port,
        config.mgmt_timeout(),
    );
    Ok(OpenVpnBlocker::new(store, client))
}

fn print_block(cn: &CommonName, outcome: &BlockOutcome) {
    if outcome.newly_blocked {
        println!("Blocked {}", cn);
    } else {
        println!("{} was already blocked", cn);
    }

    match &outcome.session {
        SessionResult::Terminated(msg) => println!("  Session: terminated ({})", msg),
        SessionResult::NotConnected(msg) => println!("  Session: not connected ({})", msg),
        SessionResult::Failed(reason) => {
            println!("  Session: kill failed, client stays connected until it reconnects");
            println!("  Reason:  {}", reason);
        }
    }
}
