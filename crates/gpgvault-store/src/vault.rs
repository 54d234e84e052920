//! Caller-facing vault operations.
//!
//! [`Vault`] ties the key resolver, the owner's key registry, and the
//! encryption engine together. Every operation takes the acting owner; a
//! record belonging to another owner is reported as [`VaultError::NotFound`].

use std::sync::Arc;

use chrono::Utc;
use gpgvault_core::{paths, Config};
use gpgvault_gpg::{is_armored_message, Encryptor, Fingerprint, GpgError, Gnupg, KeyId, KeyResolver};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::sqlite::SqliteStore;
use crate::store::VaultStore;
use crate::types::{validate_item_name, Item, ItemUpdate, Key, NewItem, OwnerId};

/// Owner-scoped key registry and encrypted item storage.
#[derive(Clone)]
pub struct Vault {
    store: Arc<dyn VaultStore>,
    resolver: KeyResolver,
    encryptor: Arc<dyn Encryptor>,
}

impl Vault {
    /// Assemble a vault from its parts.
    pub fn new(
        store: Arc<dyn VaultStore>,
        resolver: KeyResolver,
        encryptor: Arc<dyn Encryptor>,
    ) -> Self {
        Self {
            store,
            resolver,
            encryptor,
        }
    }

    /// Build the production vault: a `gpg` engine on the configured keyring
    /// home and the configured SQLite database.
    ///
    /// The configuration is validated first; nothing is created on disk for
    /// an invalid one.
    pub async fn from_config(config: &Config) -> Result<Self> {
        config.validate()?;
        let home = config.keyring_home()?;
        paths::ensure_keyring_dir(&home)?;

        let gnupg = Arc::new(Gnupg::from_config(&config.gpg, &home));
        let store = SqliteStore::connect(&config.database_url()?).await?;
        let resolver = KeyResolver::new(gnupg.clone(), config.gpg.keyserver.clone());

        debug!(home = %home.display(), keyserver = %config.gpg.keyserver, "Vault ready");
        Ok(Self::new(Arc::new(store), resolver, gnupg))
    }

    /// Keyserver consulted on local keyring misses.
    pub fn keyserver(&self) -> &str {
        self.resolver.keyserver()
    }

    // ---- keys ----

    /// Resolve `raw` and add the key to the owner's registry.
    ///
    /// The identifier is validated before the engine is touched. A key the
    /// owner already holds fails with [`VaultError::DuplicateKey`], decided by
    /// the store's unique constraint.
    pub async fn register_key(&self, owner: OwnerId, raw: &str) -> Result<Key> {
        let fingerprint = self.resolve(raw).await?;
        let key = Key::new(owner, fingerprint);
        self.store.insert_key(&key).await?;

        info!(%owner, key = %key.uuid, fingerprint = %key.fingerprint, "Registered key");
        Ok(key)
    }

    /// Re-resolve one of the owner's keys from a new identifier.
    pub async fn update_key(&self, owner: OwnerId, uuid: Uuid, raw: &str) -> Result<Key> {
        let mut key = self.get_key(owner, uuid).await?;
        key.fingerprint = self.resolve(raw).await?;
        key.updated_at = Utc::now();

        if !self.store.update_key(&key).await? {
            return Err(key_not_found(uuid));
        }

        info!(%owner, key = %uuid, fingerprint = %key.fingerprint, "Updated key");
        Ok(key)
    }

    /// Get one of the owner's keys.
    pub async fn get_key(&self, owner: OwnerId, uuid: Uuid) -> Result<Key> {
        self.store
            .get_key(owner, uuid)
            .await?
            .ok_or_else(|| key_not_found(uuid))
    }

    /// List the owner's keys, oldest first.
    pub async fn list_keys(&self, owner: OwnerId) -> Result<Vec<Key>> {
        self.store.list_keys(owner).await
    }

    /// Remove a key from the owner's registry.
    ///
    /// Items already encrypted to it are left as they are.
    pub async fn remove_key(&self, owner: OwnerId, uuid: Uuid) -> Result<()> {
        if !self.store.delete_key(owner, uuid).await? {
            return Err(key_not_found(uuid));
        }
        info!(%owner, key = %uuid, "Removed key");
        Ok(())
    }

    /// Fingerprints new item values are encrypted to.
    pub async fn list_fingerprints(&self, owner: OwnerId) -> Result<Vec<Fingerprint>> {
        self.store.list_fingerprints(owner).await
    }

    async fn resolve(&self, raw: &str) -> Result<Fingerprint> {
        let key_id = KeyId::parse(raw)?;
        Ok(self.resolver.resolve(&key_id).await?)
    }

    // ---- items ----

    /// Store a new item, encrypting its value for every key the owner holds
    /// unless the caller says it is already encrypted.
    pub async fn create_item(&self, owner: OwnerId, new: NewItem) -> Result<Item> {
        validate_item_name(&new.name)?;
        let value = self.seal(owner, new.value, new.already_encrypted).await?;

        let item = Item::new(owner, new.name, value);
        self.store.insert_item(&item).await?;

        info!(%owner, item = %item.uuid, encrypted_here = !new.already_encrypted, "Created item");
        Ok(item)
    }

    /// Replace an item's value, and its name if one is given.
    ///
    /// Nothing is written if encryption fails.
    pub async fn update_item(&self, owner: OwnerId, uuid: Uuid, update: ItemUpdate) -> Result<Item> {
        let mut item = self.get_item(owner, uuid).await?;
        if let Some(name) = update.name {
            validate_item_name(&name)?;
            item.name = name;
        }
        item.value = self
            .seal(owner, update.value, update.already_encrypted)
            .await?;
        item.updated_at = Utc::now();

        if !self.store.update_item(&item).await? {
            return Err(item_not_found(uuid));
        }

        info!(%owner, item = %uuid, encrypted_here = !update.already_encrypted, "Updated item");
        Ok(item)
    }

    /// Get one of the owner's items.
    pub async fn get_item(&self, owner: OwnerId, uuid: Uuid) -> Result<Item> {
        self.store
            .get_item(owner, uuid)
            .await?
            .ok_or_else(|| item_not_found(uuid))
    }

    /// List the owner's items, oldest first.
    pub async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>> {
        self.store.list_items(owner).await
    }

    /// Delete one of the owner's items.
    pub async fn delete_item(&self, owner: OwnerId, uuid: Uuid) -> Result<()> {
        if !self.store.delete_item(owner, uuid).await? {
            return Err(item_not_found(uuid));
        }
        info!(%owner, item = %uuid, "Deleted item");
        Ok(())
    }

    /// Turn a submitted value into what gets persisted.
    async fn seal(&self, owner: OwnerId, value: Vec<u8>, already_encrypted: bool) -> Result<Vec<u8>> {
        if already_encrypted {
            if !is_armored_message(&value) {
                warn!(%owner, "Value marked as encrypted has no PGP armor header; storing as given");
            }
            return Ok(value);
        }

        let recipients = self.store.list_fingerprints(owner).await?;
        if recipients.is_empty() {
            return Err(VaultError::EncryptionFailed(format!(
                "owner {owner} has no registered keys"
            )));
        }

        debug!(%owner, recipients = recipients.len(), "Encrypting value");
        self.encryptor
            .encrypt(&value, &recipients)
            .await
            .map_err(|e| match e {
                GpgError::EncryptionFailed(msg) => VaultError::EncryptionFailed(msg),
                other => VaultError::EncryptionFailed(other.to_string()),
            })
    }
}

fn key_not_found(uuid: Uuid) -> VaultError {
    VaultError::NotFound(format!("key {uuid}"))
}

fn item_not_found(uuid: Uuid) -> VaultError {
    VaultError::NotFound(format!("item {uuid}"))
}
