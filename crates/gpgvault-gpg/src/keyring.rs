//! Seams over the OpenPGP engine.
//!
//! Resolution and encryption depend on these traits rather than on the
//! engine directly, so the keyring can be swapped for an in-memory fake.

use async_trait::async_trait;

use crate::fingerprint::Fingerprint;
use crate::keyid::KeyId;
use crate::parse::ImportResult;
use crate::Result;

/// Local keyring lookups and keyserver imports.
#[async_trait]
pub trait Keyring: Send + Sync {
    /// Primary fingerprints of local keys matching `key_id`, in engine order.
    async fn list_keys(&self, key_id: &KeyId) -> Result<Vec<Fingerprint>>;

    /// Fetch `key_id` from `keyserver` into the local keyring.
    async fn receive_keys(&self, keyserver: &str, key_id: &KeyId) -> Result<ImportResult>;
}

/// Public-key encryption for a set of recipients.
#[async_trait]
pub trait Encryptor: Send + Sync {
    /// Encrypt `plaintext` for every recipient, returning armored ciphertext.
    ///
    /// An empty recipient set is an error; nothing is ever returned in the
    /// clear.
    async fn encrypt(&self, plaintext: &[u8], recipients: &[Fingerprint]) -> Result<Vec<u8>>;
}
