//! WireGuard blocking: reroute the peer's allowed-ips.

use super::identity::PublicKey;
use crate::acl::AclUpdater;
use crate::error::{Result, VpnBlockError};
use std::net::{IpAddr, Ipv4Addr};

/// Loopback address blocked peers are routed to.
pub const BLOCK_ENDPOINT: IpAddr = IpAddr::V4(Ipv4Addr::new(127, 0, 0, 2));

/// Result of [`WireguardBlocker::block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WgBlockOutcome {
    /// The peer was rerouted. `previous` is what to pass to unblock.
    Blocked { previous: String },
    /// The peer already pointed at [`BLOCK_ENDPOINT`].
    AlreadyBlocked,
}

/// Blocks WireGuard peers by public key.
#[derive(Debug)]
pub struct WireguardBlocker<A> {
    pub(super) acl: A,
}

impl<A: AclUpdater> WireguardBlocker<A> {
    pub fn new(acl: A) -> Self {
        Self { acl }
    }

    /// Reroute `key` to the sink address.
    ///
    /// Unknown peers are rejected: `wg set` would otherwise create them.
    pub fn block(&self, key: &PublicKey) -> Result<WgBlockOutcome> {
        log::warn!("Blocking client {}", key);

        let previous = self.require_endpoint(key)?;
        if is_block_endpoint(&previous) {
            log::info!("Client {} is already blocked", key);
            return Ok(WgBlockOutcome::AlreadyBlocked);
        }

        self.acl.set_endpoint(key.as_str(), BLOCK_ENDPOINT)?;
        log::warn!("Client {} blocked (was {})", key, previous);
        Ok(WgBlockOutcome::Blocked { previous })
    }

    /// Restore `key` to `endpoint`.
    pub fn unblock(&self, key: &PublicKey, endpoint: IpAddr) -> Result<()> {
        log::warn!("Unblocking client {}", key);

        if endpoint == BLOCK_ENDPOINT {
            return Err(VpnBlockError::UserError(format!(
                "{} is the block address; pass the client's real address",
                endpoint
            )));
        }

        self.require_endpoint(key)?;
        self.acl.set_endpoint(key.as_str(), endpoint)?;
        log::warn!("Client {} unblocked at {}", key, endpoint);
        Ok(())
    }

    /// Current allowed-ips of `key`, if the peer exists.
    pub fn endpoint(&self, key: &PublicKey) -> Result<Option<String>> {
        self.acl.current_endpoint(key.as_str())
    }

    fn require_endpoint(&self, key: &PublicKey) -> Result<String> {
        self.acl.current_endpoint(key.as_str())?.ok_or_else(|| {
            VpnBlockError::UserError(format!("peer {} is not configured on the interface", key))
        })
    }
}

fn is_block_endpoint(allowed_ips: &str) -> bool {
    let address = allowed_ips.split('/').next().unwrap_or_default();
    address.parse::<IpAddr>().is_ok_and(|ip| ip == BLOCK_ENDPOINT)
}
