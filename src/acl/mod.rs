//! Network allow-list updates for WireGuard peers.
//!
//! WireGuard has no session to kill: a peer is cut off by pointing its
//! allowed-ips at an address nothing routes to, and restored by pointing it
//! back. The blocklist store is not involved in this path.

mod command;
mod wireguard;

pub use command::{CommandOutput, run_command};
pub use wireguard::{WireguardAcl, parse_dump};

use crate::error::Result;
use std::net::IpAddr;

/// Something that can read and change the address an identity is allowed to use.
pub trait AclUpdater {
    /// Current allowed-ips entry for `identity`, if the peer is known.
    fn current_endpoint(&self, identity: &str) -> Result<Option<String>>;

    /// Route `identity` to `endpoint` and persist the change.
    fn set_endpoint(&self, identity: &str, endpoint: IpAddr) -> Result<()>;
}
