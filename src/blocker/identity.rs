//! Validated client identities.

use crate::error::{Result, VpnBlockError};
use regex::Regex;
use std::fmt;
use std::sync::LazyLock;

static COMMON_NAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s=\p{Cc}]+$").expect("Invalid common name regex")
});

static PUBLIC_KEY_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9+/]{43}=$").expect("Invalid public key regex")
});

/// An OpenVPN certificate common name, without any `CN=` prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonName(String);

impl CommonName {
    /// Validate a common name.
    ///
    /// Rejects `=` (a `CN=` prefix was passed), whitespace and control
    /// characters (they would split the management command).
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.contains('=') {
            return Err(VpnBlockError::ValidationError(format!(
                "common name {:?} should only contain the name itself, not a \"CN=\" prefix",
                raw
            )));
        }
        if !COMMON_NAME_REGEX.is_match(raw) {
            return Err(VpnBlockError::ValidationError(format!(
                "common name {:?} must be non-empty and free of whitespace and control characters",
                raw
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CommonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A base64 WireGuard public key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKey(String);

impl PublicKey {
    /// Length of a base64-encoded 32-byte key.
    pub const LEN: usize = 44;

    pub fn parse(raw: &str) -> Result<Self> {
        if !PUBLIC_KEY_REGEX.is_match(raw) {
            return Err(VpnBlockError::ValidationError(format!(
                "public key should be {} base64 symbols long and end with =",
                Self::LEN
            )));
        }
        Ok(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
