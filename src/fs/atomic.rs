//! Atomic filesystem operations for vpnblock.
//!
//! Destructive rewrites of the blocklist never modify it in place. Instead:
//! 1. Write the new content to a temporary file in the same directory
//! 2. Sync the temporary file to disk (fsync)
//! 3. Rename it over the original path
//!
//! Steps 1-2 are [`stage_lines`], step 3 is [`StagedFile::commit`]. Keeping
//! them apart lets a caller stage outside a lock and commit inside it.
//!
//! # Important Notes
//!
//! - Source and destination must be on the same filesystem for atomic rename,
//!   which is why the temporary file lives next to the target.
//! - A staged file that is dropped without being committed is deleted.
//! - On a hard crash a `.tmp.*` file may remain. Nothing reads it.

use crate::error::{Result, VpnBlockError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Prefix of temporary files created next to the target.
pub const TEMP_PREFIX: &str = ".tmp.";

/// A fully written and synced temporary file waiting to be renamed into place.
#[derive(Debug)]
pub struct StagedFile {
    temp: NamedTempFile,
}

/// Write `lines` to a new temporary file in `dir`, one per line, each
/// terminated by `\n`, and sync it to disk.
///
/// # Returns
///
/// * `Ok(StagedFile)` - Durable temporary file, not yet visible at any target
/// * `Err(VpnBlockError::Io)` - On create, write or sync failure (the
///   temporary file is removed)
pub fn stage_lines<I, S>(dir: &Path, lines: I) -> Result<StagedFile>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let temp = tempfile::Builder::new()
        .prefix(TEMP_PREFIX)
        .tempfile_in(dir)
        .map_err(|e| {
            VpnBlockError::io(
                format!("failed to create temporary file in '{}'", dir.display()),
                e,
            )
        })?;

    {
        let mut writer = BufWriter::new(temp.as_file());
        for line in lines {
            writer
                .write_all(line.as_ref().as_bytes())
                .and_then(|()| writer.write_all(b"\n"))
                .map_err(|e| write_error(&temp, e))?;
        }
        writer.flush().map_err(|e| write_error(&temp, e))?;
    }

    temp.as_file().sync_all().map_err(|e| {
        VpnBlockError::io(
            format!(
                "failed to sync temporary file '{}' to disk",
                temp.path().display()
            ),
            e,
        )
    })?;

    Ok(StagedFile { temp })
}

fn write_error(temp: &NamedTempFile, e: std::io::Error) -> VpnBlockError {
    VpnBlockError::io(
        format!("failed to write temporary file '{}'", temp.path().display()),
        e,
    )
}

impl StagedFile {
    /// Path of the temporary file.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Atomically replace `target` with the staged content.
    ///
    /// If `target` exists its permission bits are carried over first, so the
    /// replacement keeps the mode the original was created with.
    pub fn commit(self, target: &Path) -> Result<()> {
        match fs::metadata(target) {
            Ok(meta) => fs::set_permissions(self.temp.path(), meta.permissions()).map_err(|e| {
                VpnBlockError::io(
                    format!(
                        "failed to copy permissions of '{}' to temporary file",
                        target.display()
                    ),
                    e,
                )
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(VpnBlockError::io(
                    format!("failed to stat '{}'", target.display()),
                    e,
                ));
            }
        }

        // On failure the returned NamedTempFile is dropped, deleting the temp file.
        self.temp.persist(target).map_err(|e| {
            VpnBlockError::io(
                format!("failed to atomically replace '{}'", target.display()),
                e.error,
            )
        })?;

        // The rename itself succeeded; a failed directory sync only weakens
        // durability across power loss.
        if let Err(e) = sync_parent_dir(target) {
            log::warn!(
                "failed to sync directory of '{}' after replace: {}",
                target.display(),
                e
            );
        }
        Ok(())
    }
}

/// Directory containing `path`; `.` for a bare file name.
pub fn parent_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Persist the directory entry created by the rename.
fn sync_parent_dir(target: &Path) -> std::io::Result<()> {
    File::open(parent_dir(target))?.sync_all()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn temp_files(dir: &Path) -> Vec<String> {
        fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(TEMP_PREFIX))
            .collect()
    }

    #[test]
    fn test_commit_creates_new_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("list");

        stage_lines(temp_dir.path(), ["a", "b"])
            .unwrap()
            .commit(&target)
            .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "a\nb\n");
    }

    #[test]
    fn test_commit_replaces_existing() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("list");
        fs::write(&target, "original\n").unwrap();

        stage_lines(temp_dir.path(), vec!["new".to_string()])
            .unwrap()
            .commit(&target)
            .unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "new\n");
        assert!(temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_stage_empty_produces_empty_file() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("list");
        fs::write(&target, "something\n").unwrap();

        stage_lines(temp_dir.path(), Vec::<String>::new())
            .unwrap()
            .commit(&target)
            .unwrap();

        assert!(fs::read(&target).unwrap().is_empty());
    }

    #[test]
    fn test_staged_file_lives_next_to_target() {
        let temp_dir = TempDir::new().unwrap();

        let staged = stage_lines(temp_dir.path(), ["x"]).unwrap();

        assert_eq!(staged.path().parent().unwrap(), temp_dir.path());
        assert_eq!(fs::read_to_string(staged.path()).unwrap(), "x\n");
    }

    #[test]
    fn test_dropped_stage_leaves_target_untouched() {
        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("list");
        fs::write(&target, "keep\n").unwrap();

        let staged = stage_lines(temp_dir.path(), ["discard"]).unwrap();
        assert_eq!(temp_files(temp_dir.path()).len(), 1);
        drop(staged);

        assert_eq!(fs::read_to_string(&target).unwrap(), "keep\n");
        assert!(temp_files(temp_dir.path()).is_empty());
    }

    #[test]
    fn test_stage_in_missing_dir_fails_with_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing");

        let err = stage_lines(&missing, ["x"]).unwrap_err();

        assert!(matches!(err, VpnBlockError::Io { .. }));
    }

    #[test]
    fn test_parent_dir_of_bare_file_name_is_current_dir() {
        assert_eq!(parent_dir(Path::new("blocklist")), Path::new("."));
        assert_eq!(parent_dir(Path::new("/etc/blocklist")), Path::new("/etc"));
        assert_eq!(parent_dir(Path::new("dir/blocklist")), Path::new("dir"));
    }

    #[cfg(unix)]
    #[test]
    fn test_sync_parent_dir_handles_relative_target() {
        sync_parent_dir(Path::new("blocklist")).unwrap();
    }

    #[cfg(unix)]
    #[test]
    fn test_commit_preserves_target_permissions() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let target = temp_dir.path().join("list");
        fs::write(&target, "a\n").unwrap();
        fs::set_permissions(&target, fs::Permissions::from_mode(0o644)).unwrap();

        stage_lines(temp_dir.path(), ["b"])
            .unwrap()
            .commit(&target)
            .unwrap();

        let mode = fs::metadata(&target).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o644);
    }
}
