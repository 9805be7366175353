//! Error types for vpnblock.
//!
//! Uses thiserror for derive macros. Every variant maps to its own exit code
//! so shell callers can tell a malformed identity from a broken blocklist.

use crate::exit_codes;
use std::io;
use thiserror::Error;

/// Main error type for vpnblock operations.
#[derive(Error, Debug)]
pub enum VpnBlockError {
    /// User provided invalid arguments or configuration.
    #[error("{0}")]
    UserError(String),

    /// An entry or identity was rejected before touching any file.
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// The blocklist could not be opened, locked, read, written, synced or renamed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: io::Error,
    },

    /// The management interface session failed or timed out.
    #[error("Management session failed: {0}")]
    SessionError(String),

    /// An external command failed.
    #[error("Command failed: {0}")]
    CommandError(String),
}

impl VpnBlockError {
    /// Wrap an I/O error with a short description of what was being attempted.
    pub fn io(context: impl Into<String>, source: io::Error) -> Self {
        VpnBlockError::Io {
            context: context.into(),
            source,
        }
    }

    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            VpnBlockError::UserError(_) => exit_codes::USER_ERROR,
            VpnBlockError::ValidationError(_) => exit_codes::VALIDATION_FAILURE,
            VpnBlockError::Io { .. } => exit_codes::IO_FAILURE,
            VpnBlockError::SessionError(_) => exit_codes::SESSION_FAILURE,
            VpnBlockError::CommandError(_) => exit_codes::COMMAND_FAILURE,
        }
    }
}

/// Result type alias for vpnblock operations.
pub type Result<T> = std::result::Result<T, VpnBlockError>;
