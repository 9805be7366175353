//! RAII lock guard implementation.

use super::types::LockMode;
use crate::error::{Result, VpnBlockError};
use fs2::FileExt;
use std::fs::File;
use std::path::{Path, PathBuf};

/// An open blocklist handle holding an advisory lock.
///
/// When dropped, the lock is released and the handle closed.
/// If unlocking fails, a warning is logged but no panic occurs.
#[derive(Debug)]
pub struct LockedFile {
    /// The locked handle.
    file: File,

    /// Path the handle was opened from.
    path: PathBuf,

    /// Mode the lock was taken in.
    mode: LockMode,

    /// Whether the lock has been released manually.
    released: bool,
}

impl LockedFile {
    pub(super) fn new(file: File, path: PathBuf, mode: LockMode) -> Self {
        Self {
            file,
            path,
            mode,
            released: false,
        }
    }

    /// The locked handle. Use `&File` as `Read`/`Write` while the guard lives.
    pub fn file(&self) -> &File {
        &self.file
    }

    /// Get the path the lock was taken on.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn mode(&self) -> LockMode {
        self.mode
    }

    /// Manually release the lock.
    ///
    /// This is useful when you want to release the lock before the guard
    /// goes out of scope, and want to handle errors explicitly.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        FileExt::unlock(&self.file).map_err(|e| {
            VpnBlockError::io(
                format!(
                    "failed to release {} lock on '{}'",
                    self.mode,
                    self.path.display()
                ),
                e,
            )
        })
    }
}

impl Drop for LockedFile {
    fn drop(&mut self) {
        if !self.released
            && let Err(e) = FileExt::unlock(&self.file)
        {
            log::warn!(
                "failed to release {} lock on '{}': {}",
                self.mode,
                self.path.display(),
                e
            );
        }
    }
}
