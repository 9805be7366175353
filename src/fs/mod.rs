//! Filesystem utilities for vpnblock.
//!
//! This module provides the atomic replace primitive used whenever the
//! blocklist is rewritten as a whole.

pub mod atomic;

pub use atomic::{StagedFile, parent_dir, stage_lines};
