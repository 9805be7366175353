//! Configuration model for vpnblock.
//!
//! Settings are layered: built-in defaults, then an optional YAML file, then
//! environment variables, then command-line flags. YAML parsing is
//! forward-compatible (unknown fields are ignored).

mod model;
mod operations;

#[cfg(test)]
mod tests;

pub use model::Config;
pub use operations::normalize_level;
