//! Exit code constants for the vpnblock CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, bad config)
//! - 2: Validation failure (malformed entry or identity)
//! - 3: I/O failure (blocklist open/read/write/sync/rename/lock)
//! - 4: Management session failure
//! - 5: External command failure (wg, wg-quick)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments or invalid configuration.
pub const USER_ERROR: i32 = 1;

/// Validation failure: an entry or identity was rejected before any I/O.
pub const VALIDATION_FAILURE: i32 = 2;

/// I/O failure on the blocklist file, including lock acquisition.
pub const IO_FAILURE: i32 = 3;

/// The management interface session could not be completed.
pub const SESSION_FAILURE: i32 = 4;

/// An external command exited non-zero, timed out, or could not be spawned.
pub const COMMAND_FAILURE: i32 = 5;
