//! Persisted-set storage engine.
//!
//! A [`ListStore`] is a set of single-line entries kept in one plain-text
//! file, one entry per `\n`-terminated line. The file is the only state:
//! every call opens it, takes a lock, does its work and lets go, so any
//! number of processes can share one blocklist without a coordinator.
//!
//! # Operations
//!
//! | operation     | lock      | commit                                |
//! |---------------|-----------|---------------------------------------|
//! | `list`        | shared    | none                                  |
//! | `contains`    | shared    | none                                  |
//! | `add`         | exclusive | append + flush + fsync                |
//! | `remove`      | exclusive | temp file + fsync + rename            |
//! | `replace_all` | exclusive | temp file + fsync, rename under lock  |
//!
//! `add` and `remove` are idempotent and report whether they changed
//! anything. A reader never sees a partially written file: appends happen
//! under the exclusive lock and rewrites only become visible through rename.
//!
//! # Entries
//!
//! Caller-provided entries have trailing `\n` trimmed; anything that still
//! contains a line terminator, or is empty, is rejected with
//! `ValidationError` before the file is opened.

mod entry;
mod mutations;
mod read;


pub use entry::normalize_entry;

use crate::error::{Result, VpnBlockError};
use crate::fs::parent_dir;
use std::fs;
use std::path::{Path, PathBuf};

/// Handle to a blocklist file. Holds no state besides the path.
#[derive(Debug, Clone)]
pub struct ListStore {
    path: PathBuf,
}

impl ListStore {
    /// Create a handle for the blocklist at `path`, creating its parent
    /// directory if needed. The file itself is created on first use.
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();

        if path.as_os_str().is_empty() {
            return Err(VpnBlockError::UserError(
                "blocklist path must not be empty".to_string(),
            ));
        }

        let dir = parent_dir(&path);
        fs::create_dir_all(dir).map_err(|e| {
            VpnBlockError::io(
                format!("failed to create blocklist directory '{}'", dir.display()),
                e,
            )
        })?;

        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Directory temporary files are staged in.
    fn dir(&self) -> &Path {
        parent_dir(&self.path)
    }
}
