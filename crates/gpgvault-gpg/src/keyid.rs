//! Key identifier normalization.
//!
//! Accepts the three forms people paste around: a short (8 hex) or long
//! (16 hex) key id, or a full 40 hex fingerprint, each with an optional `0x`
//! prefix. The canonical form drops the prefix and keeps the submitted case.

use std::fmt;
use std::str::FromStr;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::GpgError;
use crate::Result;

static KEY_ID_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(0x)?([a-fA-F0-9]{8}|[a-fA-F0-9]{16}|[a-fA-F0-9]{40})$")
        .expect("key id pattern is valid")
});

/// Which of the accepted identifier lengths was submitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyIdKind {
    /// 8 hex characters.
    Short,
    /// 16 hex characters.
    Long,
    /// 40 hex characters.
    Fingerprint,
}

/// A validated key identifier, without `0x` prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    /// Validate and canonicalize a user-supplied identifier.
    pub fn parse(raw: &str) -> Result<Self> {
        let caps = KEY_ID_RE
            .captures(raw)
            .ok_or_else(|| GpgError::InvalidFormat(raw.to_string()))?;
        Ok(Self(caps[2].to_string()))
    }

    /// The identifier as handed to the engine.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Length class of the identifier.
    pub fn kind(&self) -> KeyIdKind {
        match self.0.len() {
            8 => KeyIdKind::Short,
            16 => KeyIdKind::Long,
            _ => KeyIdKind::Fingerprint,
        }
    }
}

impl fmt::Display for KeyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for KeyId {
    type Err = GpgError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl TryFrom<String> for KeyId {
    type Error = GpgError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(&value)
    }
}

impl From<KeyId> for String {
    fn from(id: KeyId) -> Self {
        id.0
    }
}
