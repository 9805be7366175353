//! Tests for the locks subsystem.

use super::*;
use fs2::FileExt;
use std::fs::{self, File};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;
use tempfile::TempDir;

fn blocklist_path(temp_dir: &TempDir) -> std::path::PathBuf {
    temp_dir.path().join("blocklist")
}

#[test]
fn test_open_creates_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);
    assert!(!path.exists());

    let guard = LockedFile::open(&path, LockMode::Shared).unwrap();

    assert!(path.exists());
    assert_eq!(guard.path(), path.as_path());
    assert_eq!(guard.mode(), LockMode::Shared);
    assert_eq!(fs::metadata(&path).unwrap().len(), 0);
}

#[test]
fn test_open_does_not_truncate_existing_content() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);
    fs::write(&path, "alice\n").unwrap();

    let guard = LockedFile::open(&path, LockMode::Exclusive).unwrap();
    drop(guard);

    assert_eq!(fs::read_to_string(&path).unwrap(), "alice\n");
}

#[test]
fn test_shared_locks_are_co_held() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);

    let first = LockedFile::open(&path, LockMode::Shared).unwrap();
    let second = LockedFile::open(&path, LockMode::Shared).unwrap();

    // A third party can still take a shared lock, but not an exclusive one.
    let probe = File::open(&path).unwrap();
    assert!(FileExt::try_lock_exclusive(&probe).is_err());
    FileExt::try_lock_shared(&probe).unwrap();

    drop(first);
    drop(second);
}

#[test]
fn test_exclusive_lock_excludes_readers() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);

    let guard = LockedFile::open(&path, LockMode::Exclusive).unwrap();

    let probe = File::open(&path).unwrap();
    assert!(FileExt::try_lock_shared(&probe).is_err());

    drop(guard);

    FileExt::try_lock_shared(&probe).unwrap();
}

#[test]
fn test_release_unlocks_immediately() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);

    let guard = LockedFile::open(&path, LockMode::Exclusive).unwrap();
    guard.release().unwrap();

    let probe = File::open(&path).unwrap();
    FileExt::try_lock_exclusive(&probe).unwrap();
}

#[test]
fn test_writer_waits_for_reader() {
    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);

    let reader = LockedFile::open(&path, LockMode::Shared).unwrap();
    let acquired = Arc::new(AtomicBool::new(false));

    let writer = {
        let path = path.clone();
        let acquired = Arc::clone(&acquired);
        thread::spawn(move || {
            let guard = LockedFile::open(&path, LockMode::Exclusive).unwrap();
            acquired.store(true, Ordering::SeqCst);
            drop(guard);
        })
    };

    thread::sleep(Duration::from_millis(200));
    assert!(!acquired.load(Ordering::SeqCst));

    drop(reader);
    writer.join().unwrap();
    assert!(acquired.load(Ordering::SeqCst));
}

#[cfg(unix)]
#[test]
fn test_open_follows_replaced_file() {
    use std::os::unix::fs::MetadataExt;

    let temp_dir = TempDir::new().unwrap();
    let path = blocklist_path(&temp_dir);
    fs::write(&path, "old\n").unwrap();

    let holder = LockedFile::open(&path, LockMode::Exclusive).unwrap();

    let waiter = {
        let path = path.clone();
        thread::spawn(move || {
            let guard = LockedFile::open(&path, LockMode::Exclusive).unwrap();
            guard.file().metadata().unwrap().ino()
        })
    };

    // Let the waiter open the old file and block on it.
    thread::sleep(Duration::from_millis(200));

    let replacement = temp_dir.path().join("replacement");
    fs::write(&replacement, "new\n").unwrap();
    fs::rename(&replacement, &path).unwrap();
    drop(holder);

    let locked_ino = waiter.join().unwrap();
    assert_eq!(locked_ino, fs::metadata(&path).unwrap().ino());
}

#[test]
fn test_lock_mode_display() {
    assert_eq!(LockMode::Shared.to_string(), "shared");
    assert_eq!(LockMode::Exclusive.to_string(), "exclusive");
}
