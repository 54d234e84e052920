//! Resolution of key identifiers to fingerprints.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::GpgError;
use crate::fingerprint::Fingerprint;
use crate::keyid::KeyId;
use crate::keyring::Keyring;
use crate::Result;

/// Turns a key id into a fingerprint, importing from a keyserver on a miss.
///
/// With several local matches the first one in engine listing order wins.
/// That order is whatever the engine reports for its keyring and is not
/// guaranteed stable across engine versions.
#[derive(Clone)]
pub struct KeyResolver {
    keyring: Arc<dyn Keyring>,
    keyserver: String,
}

impl KeyResolver {
    /// Create a resolver importing from `keyserver` on local misses.
    pub fn new(keyring: Arc<dyn Keyring>, keyserver: impl Into<String>) -> Self {
        Self {
            keyring,
            keyserver: keyserver.into(),
        }
    }

    /// Configured keyserver address.
    pub fn keyserver(&self) -> &str {
        &self.keyserver
    }

    /// Resolve `key_id`, consulting the local keyring first.
    ///
    /// An import that succeeds leaves the key in the shared keyring even if
    /// the caller's later steps fail; a repeated import is a no-op.
    pub async fn resolve(&self, key_id: &KeyId) -> Result<Fingerprint> {
        let local = self.keyring.list_keys(key_id).await?;
        if let Some(fpr) = local.into_iter().next() {
            debug!(%key_id, fingerprint = %fpr, "resolved from local keyring");
            return Ok(fpr);
        }

        debug!(%key_id, keyserver = %self.keyserver, "not in local keyring, receiving");
        let imported = self.keyring.receive_keys(&self.keyserver, key_id).await?;

        if imported.count == 0 {
            return Err(self.not_found(key_id));
        }

        match imported.fingerprints.into_iter().next() {
            Some(fpr) => {
                info!(%key_id, fingerprint = %fpr, keyserver = %self.keyserver, "imported key");
                Ok(fpr)
            }
            None => Err(self.not_found(key_id)),
        }
    }

    fn not_found(&self, key_id: &KeyId) -> GpgError {
        GpgError::KeyNotFound {
            key_id: key_id.to_string(),
            keyserver: self.keyserver.clone(),
        }
    }
}
