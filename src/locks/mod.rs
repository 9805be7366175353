//! Locking subsystem for vpnblock.
//!
//! The blocklist is shared between unrelated processes, so every access is
//! serialized with an advisory whole-file lock (`flock(2)` via `fs2`) taken on
//! the blocklist file itself:
//! - **Shared** for `list`/`contains`: any number of readers at once.
//! - **Exclusive** for `add`/`remove`/`replace_all`: excludes everyone else.
//!
//! # RAII Guards
//!
//! A lock is represented by a [`LockedFile`] that owns the open handle. The
//! lock is released when the guard is dropped, or explicitly with
//! [`LockedFile::release`] when the caller wants to see the error. If the
//! process dies inside a critical section the kernel drops the lock together
//! with the file descriptor.
//!
//! # Stale Handles
//!
//! Writers replace the blocklist by renaming a new file over the path. A
//! caller that opened the old file and then blocked on the lock would wake up
//! holding a lock on an unlinked inode. [`LockedFile::open`] detects this after
//! the lock is granted and reopens the path.

mod guard;
mod operations;
mod types;

#[cfg(test)]
mod tests;

pub use guard::LockedFile;
pub use types::LockMode;
