//! Session state and outcome types.

use std::fmt;

/// States of one management interface conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Connecting,
    AwaitingBanner,
    SendingCommand,
    AwaitingAck,
    Done,
    Failed,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Connecting => "connecting",
            SessionState::AwaitingBanner => "awaiting-banner",
            SessionState::SendingCommand => "sending-command",
            SessionState::AwaitingAck => "awaiting-ack",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
        }
    }

    /// Whether the conversation is over.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SessionState::Done | SessionState::Failed)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the server reported for a `kill` request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminateOutcome {
    /// The server killed at least one session. Carries the server message.
    Terminated(String),
    /// No session with that identity was connected.
    NotConnected(String),
}
