//! Entry validation.

use crate::error::{Result, VpnBlockError};

/// Normalize a caller-provided entry.
///
/// Trailing `\n` characters are trimmed. The remainder must be non-empty and
/// free of `\n` and `\r`, otherwise it could not round-trip through a
/// line-per-entry file.
pub fn normalize_entry(raw: &str) -> Result<&str> {
    let entry = raw.trim_end_matches('\n');

    if entry.is_empty() {
        return Err(VpnBlockError::ValidationError(
            "entry must not be empty".to_string(),
        ));
    }

    if entry.contains(['\n', '\r']) {
        return Err(VpnBlockError::ValidationError(format!(
            "entry {:?} contains a line terminator",
            entry
        )));
    }

    Ok(entry)
}
