//! Canonical fingerprints and their human-readable layout.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GpgError;
use crate::Result;

/// Shown in place of a fingerprint for a key that was never resolved.
pub const NO_FINGERPRINT: &str = "NO FINGERPRINT";

const FINGERPRINT_LEN: usize = 40;

/// A 40 hex character OpenPGP v4 fingerprint, as reported by the engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Validate an engine- or database-supplied fingerprint.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.len() == FINGERPRINT_LEN && raw.bytes().all(|b| b.is_ascii_hexdigit()) {
            Ok(Self(raw.to_string()))
        } else {
            Err(GpgError::InvalidFingerprint(raw.to_string()))
        }
    }

    /// The raw 40 character form.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Grouped form, e.g. `ABCD ABCD ABCD ABCD ABCD  ABCD ABCD ABCD ABCD ABCD`.
    pub fn pretty(&self) -> String {
        let chunks: Vec<&str> = (0..FINGERPRINT_LEN)
            .step_by(4)
            .map(|i| &self.0[i..i + 4])
            .collect();
        format!("{}  {}", chunks[..5].join(" "), chunks[5..].join(" "))
    }
}

/// Human-readable fingerprint, or [`NO_FINGERPRINT`] when there is none.
pub fn prettify_fingerprint(fingerprint: Option<&Fingerprint>) -> String {
    match fingerprint {
        Some(fpr) => fpr.pretty(),
        None => NO_FINGERPRINT.to_string(),
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for Fingerprint {
    type Error = GpgError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<Fingerprint> for String {
    fn from(fpr: Fingerprint) -> Self {
        fpr.0
    }
}

impl AsRef<str> for Fingerprint {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
