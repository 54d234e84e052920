//! Storage backends.
//!
//! Defines the [`VaultStore`] trait and provides [`MemoryStore`]. The SQLite
//! backend lives in [`crate::sqlite`]. Every query is scoped by owner; a
//! record belonging to someone else is indistinguishable from a missing one.

use std::collections::HashMap;

use async_trait::async_trait;
use gpgvault_gpg::Fingerprint;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::types::{Item, Key, OwnerId};

/// Async trait for vault persistence.
///
/// Implementations must enforce (owner, fingerprint) uniqueness atomically
/// and report a violation as [`VaultError::DuplicateKey`].
#[async_trait]
pub trait VaultStore: Send + Sync {
    /// Insert a key record.
    async fn insert_key(&self, key: &Key) -> Result<()>;

    /// Get one of an owner's keys.
    async fn get_key(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Key>>;

    /// List an owner's keys, oldest first.
    async fn list_keys(&self, owner: OwnerId) -> Result<Vec<Key>>;

    /// Store a key's new fingerprint and `updated_at`. Returns false if the
    /// owner has no such key.
    async fn update_key(&self, key: &Key) -> Result<bool>;

    /// Delete one of an owner's keys. Returns false if it did not exist.
    async fn delete_key(&self, owner: OwnerId, uuid: Uuid) -> Result<bool>;

    /// Fingerprints of all keys the owner currently has.
    async fn list_fingerprints(&self, owner: OwnerId) -> Result<Vec<Fingerprint>>;

    /// Insert an item record.
    async fn insert_item(&self, item: &Item) -> Result<()>;

    /// Get one of an owner's items.
    async fn get_item(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Item>>;

    /// List an owner's items, oldest first.
    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>>;

    /// Overwrite an item's name, value, and `updated_at`. Returns false if
    /// the owner has no such item.
    async fn update_item(&self, item: &Item) -> Result<bool>;

    /// Delete one of an owner's items. Returns false if it did not exist.
    async fn delete_item(&self, owner: OwnerId, uuid: Uuid) -> Result<bool>;
}

#[derive(Default)]
struct Tables {
    keys: HashMap<Uuid, Key>,
    items: HashMap<Uuid, Item>,
}

impl Tables {
    fn fingerprint_taken(&self, owner: OwnerId, fpr: &Fingerprint, except: Option<Uuid>) -> bool {
        self.keys.values().any(|k| {
            k.owner == owner && &k.fingerprint == fpr && Some(k.uuid) != except
        })
    }
}

/// In-memory store, for tests and ephemeral use.
///
/// The uniqueness check and the insert happen under one write lock, so
/// concurrent registrations of the same pair cannot both succeed.
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create an empty in-memory store.
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables::default()),
        }
    }
}

#[async_trait]
impl VaultStore for MemoryStore {
    async fn insert_key(&self, key: &Key) -> Result<()> {
        let mut tables = self.tables.write().await;
        if tables.fingerprint_taken(key.owner, &key.fingerprint, None) {
            return Err(VaultError::DuplicateKey(key.fingerprint.to_string()));
        }
        tables.keys.insert(key.uuid, key.clone());
        Ok(())
    }

    async fn get_key(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Key>> {
        let tables = self.tables.read().await;
        Ok(tables.keys.get(&uuid).filter(|k| k.owner == owner).cloned())
    }

    async fn list_keys(&self, owner: OwnerId) -> Result<Vec<Key>> {
        let tables = self.tables.read().await;
        let mut keys: Vec<Key> = tables
            .keys
            .values()
            .filter(|k| k.owner == owner)
            .cloned()
            .collect();
        keys.sort_by_key(|k| k.created_at);
        Ok(keys)
    }

    async fn update_key(&self, key: &Key) -> Result<bool> {
        let mut tables = self.tables.write().await;
        if tables.fingerprint_taken(key.owner, &key.fingerprint, Some(key.uuid)) {
            return Err(VaultError::DuplicateKey(key.fingerprint.to_string()));
        }
        match tables.keys.get_mut(&key.uuid) {
            Some(existing) if existing.owner == key.owner => {
                existing.fingerprint = key.fingerprint.clone();
                existing.updated_at = key.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_key(&self, owner: OwnerId, uuid: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.keys.get(&uuid) {
            Some(k) if k.owner == owner => {
                tables.keys.remove(&uuid);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn list_fingerprints(&self, owner: OwnerId) -> Result<Vec<Fingerprint>> {
        Ok(self
            .list_keys(owner)
            .await?
            .into_iter()
            .map(|k| k.fingerprint)
            .collect())
    }

    async fn insert_item(&self, item: &Item) -> Result<()> {
        let mut tables = self.tables.write().await;
        tables.items.insert(item.uuid, item.clone());
        Ok(())
    }

    async fn get_item(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Item>> {
        let tables = self.tables.read().await;
        Ok(tables.items.get(&uuid).filter(|i| i.owner == owner).cloned())
    }

    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>> {
        let tables = self.tables.read().await;
        let mut items: Vec<Item> = tables
            .items
            .values()
            .filter(|i| i.owner == owner)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.created_at);
        Ok(items)
    }

    async fn update_item(&self, item: &Item) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.items.get_mut(&item.uuid) {
            Some(existing) if existing.owner == item.owner => {
                existing.name = item.name.clone();
                existing.value = item.value.clone();
                existing.updated_at = item.updated_at;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn delete_item(&self, owner: OwnerId, uuid: Uuid) -> Result<bool> {
        let mut tables = self.tables.write().await;
        match tables.items.get(&uuid) {
            Some(i) if i.owner == owner => {
                tables.items.remove(&uuid);
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
