//! Owner-scoped vault records.

use std::fmt;

use chrono::{DateTime, Utc};
use gpgvault_gpg::{prettify_fingerprint, Fingerprint};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, VaultError};

/// Maximum length of an item's display name, in characters.
pub const MAX_ITEM_NAME_LEN: usize = 254;

/// External account that owns keys and items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(pub i64);

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for OwnerId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// A public key an owner trusts as an encryption recipient.
///
/// Each owner keeps an independent record even when several owners register
/// the same public key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Key {
    pub uuid: Uuid,
    pub owner: OwnerId,
    pub fingerprint: Fingerprint,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Key {
    /// Create a key record for a freshly resolved fingerprint.
    pub fn new(owner: OwnerId, fingerprint: Fingerprint) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            owner,
            fingerprint,
            created_at: now,
            updated_at: now,
        }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&prettify_fingerprint(Some(&self.fingerprint)))
    }
}

/// A stored secret. `value` is ciphertext unless the writer asserted it
/// already was.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    pub uuid: Uuid,
    pub owner: OwnerId,
    pub name: String,
    #[serde(with = "crate::codec::base64_bytes")]
    pub value: Vec<u8>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Item {
    /// Create an item record; `value` must already be sealed.
    pub fn new(owner: OwnerId, name: impl Into<String>, value: Vec<u8>) -> Self {
        let now = Utc::now();
        Self {
            uuid: Uuid::new_v4(),
            owner,
            name: name.into(),
            value,
            created_at: now,
            updated_at: now,
        }
    }
}

// Values stay out of logs even when they are ciphertext
impl fmt::Debug for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Item")
            .field("uuid", &self.uuid)
            .field("owner", &self.owner)
            .field("name", &self.name)
            .field("value", &format_args!("[{} bytes]", self.value.len()))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

/// Request to store a new item.
pub struct NewItem {
    /// Display label.
    pub name: String,

    /// Plaintext, or ciphertext when `already_encrypted` is set.
    pub value: Vec<u8>,

    /// Caller asserts `value` is already ciphertext; it is stored verbatim.
    pub already_encrypted: bool,
}

impl NewItem {
    /// A plaintext value to be encrypted for the owner's keys.
    pub fn plaintext(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            already_encrypted: false,
        }
    }

    /// A value the caller already encrypted.
    pub fn encrypted(name: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            already_encrypted: true,
        }
    }
}

/// Request to replace an item's value (and optionally its name).
pub struct ItemUpdate {
    /// New display label, if renaming.
    pub name: Option<String>,

    /// Replacement value.
    pub value: Vec<u8>,

    /// Caller asserts `value` is already ciphertext.
    pub already_encrypted: bool,
}

impl ItemUpdate {
    /// Replace the value with plaintext to be encrypted.
    pub fn plaintext(value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            value: value.into(),
            already_encrypted: false,
        }
    }

    /// Replace the value with caller-supplied ciphertext.
    pub fn encrypted(value: impl Into<Vec<u8>>) -> Self {
        Self {
            name: None,
            value: value.into(),
            already_encrypted: true,
        }
    }

    /// Also rename the item.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Validate an item display name.
pub fn validate_item_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(VaultError::Validation(
            "name must not be empty".to_string(),
        ));
    }
    let len = name.chars().count();
    if len > MAX_ITEM_NAME_LEN {
        return Err(VaultError::Validation(format!(
            "name exceeds maximum length of {MAX_ITEM_NAME_LEN} characters ({len})"
        )));
    }
    Ok(())
}
