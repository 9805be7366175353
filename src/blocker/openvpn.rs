//! OpenVPN blocking: kill the session, then persist the common name.

use super::identity::CommonName;
use crate::error::Result;
use crate::session::{SessionTerminator, TerminateOutcome};
use crate::store::ListStore;

/// What happened to the live session while blocking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionResult {
    /// The server killed the session. Carries the server message.
    Terminated(String),
    /// The client was not connected.
    NotConnected(String),
    /// The session could not be killed; the block was still recorded.
    Failed(String),
}

impl From<TerminateOutcome> for SessionResult {
    fn from(outcome: TerminateOutcome) -> Self {
        match outcome {
            TerminateOutcome::Terminated(msg) => SessionResult::Terminated(msg),
            TerminateOutcome::NotConnected(msg) => SessionResult::NotConnected(msg),
        }
    }
}

/// Result of [`OpenVpnBlocker::block`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockOutcome {
    /// `false` when the common name was already in the blocklist.
    pub newly_blocked: bool,
    pub session: SessionResult,
}

/// Result of [`OpenVpnBlocker::unblock`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnblockOutcome {
    Unblocked,
    /// The common name was not in the blocklist.
    NotBlocked,
}

/// Blocks OpenVPN clients by common name.
#[derive(Debug)]
pub struct OpenVpnBlocker<T> {
    store: ListStore,
    pub(super) terminator: T,
}

impl<T: SessionTerminator> OpenVpnBlocker<T> {
    pub fn new(store: ListStore, terminator: T) -> Self {
        Self { store, terminator }
    }

    pub fn store(&self) -> &ListStore {
        &self.store
    }

    /// Kill any live session for `cn` and add it to the blocklist.
    ///
    /// A failure to kill the session is logged and reported in the outcome;
    /// the blocklist is updated regardless. Blocklist errors are returned.
    pub fn block(&self, cn: &CommonName) -> Result<BlockOutcome> {
        log::warn!("Blocking client with CN {}", cn);

        let session = match self.terminator.terminate(cn.as_str()) {
            Ok(outcome) => {
                log::info!("Command to kill client {} sent", cn);
                SessionResult::from(outcome)
            }
            Err(e) => {
                log::error!(
                    "failed to kill session of {}, blocking anyway: {}",
                    cn,
                    e
                );
                SessionResult::Failed(e.to_string())
            }
        };

        let newly_blocked = self.store.add(cn.as_str()).inspect_err(|e| {
            log::error!("failed to add {} to the blocklist: {}", cn, e);
        })?;

        if newly_blocked {
            log::warn!("Client {} blocked.", cn);
        } else {
            log::info!("Client {} was already blocked.", cn);
        }

        Ok(BlockOutcome {
            newly_blocked,
            session,
        })
    }

    /// Remove `cn` from the blocklist so it may connect again.
    pub fn unblock(&self, cn: &CommonName) -> Result<UnblockOutcome> {
        log::warn!("Unblocking client with CN {}", cn);

        let removed = self.store.remove(cn.as_str()).inspect_err(|e| {
            log::error!("failed to remove {} from the blocklist: {}", cn, e);
        })?;

        if removed {
            log::warn!("Client {} unblocked and may connect.", cn);
            Ok(UnblockOutcome::Unblocked)
        } else {
            log::info!("Client {} was not in the blocklist.", cn);
            Ok(UnblockOutcome::NotBlocked)
        }
    }

    /// All blocked common names in blocklist order.
    pub fn blocked(&self) -> Result<Vec<String>> {
        self.store.list()
    }
}
