//! Read/query path: `list` and `contains` under a shared lock.

use super::ListStore;
use super::entry::normalize_entry;
use crate::error::{Result, VpnBlockError};
use crate::locks::{LockMode, LockedFile};
use std::io::{BufRead, BufReader, Read};

impl ListStore {
    /// Snapshot of all entries in file order.
    ///
    /// Blank lines are skipped. Duplicates left by external edits are
    /// returned as they are.
    pub fn list(&self) -> Result<Vec<String>> {
        let guard = LockedFile::open(&self.path, LockMode::Shared)?;
        let content = read_all(&guard)?;
        guard.release()?;

        Ok(parse_entries(&content).map(str::to_owned).collect())
    }

    /// Whether `item` is present. Stops reading at the first match.
    pub fn contains(&self, item: &str) -> Result<bool> {
        let item = normalize_entry(item)?;
        let guard = LockedFile::open(&self.path, LockMode::Shared)?;

        let found = {
            let mut reader = BufReader::new(guard.file());
            let mut line = String::new();
            loop {
                line.clear();
                let read = reader
                    .read_line(&mut line)
                    .map_err(|e| read_error(&guard, e))?;
                if read == 0 {
                    break false;
                }
                if line.strip_suffix('\n').unwrap_or(&line) == item {
                    break true;
                }
            }
        };

        guard.release()?;
        Ok(found)
    }
}

/// Read the whole file through a locked handle.
pub(super) fn read_all(guard: &LockedFile) -> Result<String> {
    let mut content = String::new();
    let mut file = guard.file();
    file.read_to_string(&mut content)
        .map_err(|e| read_error(guard, e))?;
    Ok(content)
}

/// Non-empty lines of `content`, terminator stripped.
pub(super) fn parse_entries(content: &str) -> impl Iterator<Item = &str> {
    content.split('\n').filter(|line| !line.is_empty())
}

fn read_error(guard: &LockedFile, e: std::io::Error) -> VpnBlockError {
    VpnBlockError::io(format!("failed to read '{}'", guard.path().display()), e)
}
