//! Session termination through the OpenVPN management interface.
//!
//! Blocking a client only stops future connections; a client that is online
//! keeps its tunnel until the server drops it. [`ManagementClient`] connects
//! to the management port and issues `kill <common name>`.
//!
//! The exchange is a small line protocol driven by an explicit state machine
//! (see [`SessionState`]) with one deadline covering the whole conversation.

mod client;
mod types;


pub use client::ManagementClient;
pub use types::{SessionState, TerminateOutcome};

use crate::error::Result;

/// Something that can end a live session for an identity.
pub trait SessionTerminator {
    fn terminate(&self, identity: &str) -> Result<TerminateOutcome>;
}
