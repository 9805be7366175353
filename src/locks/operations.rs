//! Lock acquisition.

use super::guard::LockedFile;
use super::types::LockMode;
use crate::error::{Result, VpnBlockError};
use fs2::FileExt;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;

impl LockedFile {
    /// Open `path` (creating it empty if absent) and block until a lock in
    /// `mode` is granted.
    ///
    /// The handle is opened read + append, so a holder of an exclusive lock
    /// can read the current contents and append to them through the same
    /// descriptor.
    ///
    /// # Returns
    ///
    /// * `Ok(LockedFile)` - Lock held on the file the path currently names
    /// * `Err(VpnBlockError::Io)` - Open, lock or stat failure
    pub fn open(path: &Path, mode: LockMode) -> Result<Self> {
        loop {
            let file = open_or_create(path)?;

            let locked = match mode {
                LockMode::Shared => FileExt::lock_shared(&file),
                LockMode::Exclusive => FileExt::lock_exclusive(&file),
            };
            locked.map_err(|e| {
                VpnBlockError::io(
                    format!("failed to acquire {} lock on '{}'", mode, path.display()),
                    e,
                )
            })?;

            let guard = LockedFile::new(file, path.to_path_buf(), mode);

            if is_current(guard.file(), path).map_err(|e| {
                VpnBlockError::io(format!("failed to stat '{}'", path.display()), e)
            })? {
                return Ok(guard);
            }

            // The path was replaced while we waited; the guard drops here and
            // the next iteration opens the new file.
            log::debug!(
                "'{}' was replaced while waiting for a {} lock, reopening",
                path.display(),
                mode
            );
        }
    }
}

fn open_or_create(path: &Path) -> Result<File> {
    OpenOptions::new()
        .read(true)
        .append(true)
        .create(true)
        .open(path)
        .map_err(|e| VpnBlockError::io(format!("failed to open '{}'", path.display()), e))
}

/// Whether `file` is still the file that `path` resolves to.
#[cfg(unix)]
fn is_current(file: &File, path: &Path) -> io::Result<bool> {
    use std::os::unix::fs::MetadataExt;

    let held = file.metadata()?;
    match fs::metadata(path) {
        Ok(current) => Ok(held.dev() == current.dev() && held.ino() == current.ino()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Renaming over an open file fails on Windows, so a granted lock always
/// refers to the current file.
#[cfg(not(unix))]
fn is_current(_file: &File, path: &Path) -> io::Result<bool> {
    fs::metadata(path).map(|_| true)
}
