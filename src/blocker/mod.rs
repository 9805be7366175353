//! Block/unblock orchestration.
//!
//! Ties identities to the two enforcement paths:
//! - OpenVPN: end the live session, then record the common name in the
//!   blocklist the server consults on connect.
//! - WireGuard: point the peer's allowed-ips at a sink address.
//!
//! Every operation returns an explicit outcome describing what changed.

mod identity;
mod openvpn;
mod wireguard;


pub use identity::{CommonName, PublicKey};
pub use openvpn::{BlockOutcome, OpenVpnBlocker, SessionResult, UnblockOutcome};
pub use wireguard::{BLOCK_ENDPOINT, WgBlockOutcome, WireguardBlocker};
