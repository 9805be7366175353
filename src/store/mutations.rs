//! Mutation path: idempotent add/remove and bulk replace, all under an
//! exclusive lock.

use super::ListStore;
use super::entry::normalize_entry;
use super::read::{parse_entries, read_all};
use crate::error::{Result, VpnBlockError};
use crate::fs::stage_lines;
use crate::locks::{LockMode, LockedFile};
use std::collections::HashSet;
use std::io::Write;

impl ListStore {
    /// Insert `item` if absent.
    ///
    /// Returns `true` if the entry was appended, `false` if it was already
    /// present (nothing is written). The membership check and the append
    /// happen under one exclusive lock.
    pub fn add(&self, item: &str) -> Result<bool> {
        let item = normalize_entry(item)?;
        let guard = LockedFile::open(&self.path, LockMode::Exclusive)?;
        let content = read_all(&guard)?;

        let present: HashSet<&str> = parse_entries(&content).collect();
        if present.contains(item) {
            guard.release()?;
            log::debug!("{:?} already in '{}'", item, self.path.display());
            return Ok(false);
        }

        // An external edit may have dropped the final newline; never glue
        // the new entry onto the last one.
        let mut record = String::with_capacity(item.len() + 2);
        if !content.is_empty() && !content.ends_with('\n') {
            record.push('\n');
        }
        record.push_str(item);
        record.push('\n');

        let mut file = guard.file();
        file.write_all(record.as_bytes())
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_all())
            .map_err(|e| {
                VpnBlockError::io(
                    format!("failed to append to '{}'", self.path.display()),
                    e,
                )
            })?;

        guard.release()?;
        log::debug!("appended {:?} to '{}'", item, self.path.display());
        Ok(true)
    }

    /// Delete `item` if present.
    ///
    /// Returns `true` if the entry was removed, `false` if it was absent
    /// (nothing is written). The remaining entries, de-duplicated in file
    /// order, are committed through an atomic replace before the lock is
    /// released.
    pub fn remove(&self, item: &str) -> Result<bool> {
        let item = normalize_entry(item)?;
        let guard = LockedFile::open(&self.path, LockMode::Exclusive)?;
        let content = read_all(&guard)?;

        let entries: Vec<&str> = parse_entries(&content).collect();
        if !entries.contains(&item) {
            guard.release()?;
            log::debug!("{:?} not in '{}'", item, self.path.display());
            return Ok(false);
        }

        let kept = unique_in_order(entries.into_iter().filter(|entry| *entry != item));
        stage_lines(self.dir(), kept)?.commit(&self.path)?;

        guard.release()?;
        log::debug!("removed {:?} from '{}'", item, self.path.display());
        Ok(true)
    }

    /// Overwrite the whole store with `items`.
    ///
    /// Every item is validated before anything is written; duplicates are
    /// dropped keeping the first occurrence. The new content is staged and
    /// synced without the lock, which is only held for the rename.
    pub fn replace_all<I, S>(&self, items: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let raw: Vec<S> = items.into_iter().collect();
        let normalized = raw
            .iter()
            .map(|item| normalize_entry(item.as_ref()))
            .collect::<Result<Vec<&str>>>()?;
        let unique = unique_in_order(normalized);

        let staged = stage_lines(self.dir(), &unique)?;

        let guard = LockedFile::open(&self.path, LockMode::Exclusive)?;
        staged.commit(&self.path)?;
        guard.release()?;

        log::debug!(
            "replaced '{}' with {} entries",
            self.path.display(),
            unique.len()
        );
        Ok(())
    }
}

/// Drop repeated entries, keeping the first occurrence of each.
fn unique_in_order<'a>(entries: impl IntoIterator<Item = &'a str>) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    entries
        .into_iter()
        .filter(|entry| seen.insert(*entry))
        .collect()
}
