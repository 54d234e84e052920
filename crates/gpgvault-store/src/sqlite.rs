//! SQLite storage backend.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gpgvault_gpg::Fingerprint;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;
use tracing::debug;
use uuid::Uuid;

use crate::error::{Result, VaultError};
use crate::store::VaultStore;
use crate::types::{Item, Key, OwnerId};

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS vault_keys (
        uuid TEXT PRIMARY KEY NOT NULL,
        owner_id INTEGER NOT NULL,
        fingerprint TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL,
        UNIQUE (owner_id, fingerprint)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS vault_items (
        uuid TEXT PRIMARY KEY NOT NULL,
        owner_id INTEGER NOT NULL,
        name TEXT NOT NULL,
        value BLOB NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_vault_items_owner ON vault_items (owner_id)",
];

#[derive(FromRow)]
struct KeyRow {
    uuid: String,
    owner_id: i64,
    fingerprint: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<KeyRow> for Key {
    type Error = VaultError;

    fn try_from(row: KeyRow) -> Result<Self> {
        Ok(Self {
            uuid: parse_uuid(&row.uuid)?,
            owner: OwnerId(row.owner_id),
            fingerprint: Fingerprint::parse(&row.fingerprint)
                .map_err(|e| VaultError::Storage(e.to_string()))?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[derive(FromRow)]
struct ItemRow {
    uuid: String,
    owner_id: i64,
    name: String,
    value: Vec<u8>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ItemRow> for Item {
    type Error = VaultError;

    fn try_from(row: ItemRow) -> Result<Self> {
        Ok(Self {
            uuid: parse_uuid(&row.uuid)?,
            owner: OwnerId(row.owner_id),
            name: row.name,
            value: row.value,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

fn parse_uuid(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw).map_err(|e| VaultError::Storage(format!("bad uuid {raw:?}: {e}")))
}

/// Map a unique-constraint violation to [`VaultError::DuplicateKey`].
fn key_write_error(err: sqlx::Error, fingerprint: &Fingerprint) -> VaultError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            VaultError::DuplicateKey(fingerprint.to_string())
        }
        _ => VaultError::Database(err),
    }
}

/// Vault store backed by a SQLite database.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open (creating if missing) the database at `url` and apply the schema.
    pub async fn connect(url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let filename = options.clone().get_filename();
        if let Some(parent) = filename.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    VaultError::Storage(format!("create {}: {e}", parent.display()))
                })?;
            }
        }
        let pool = SqlitePoolOptions::new().connect_with(options).await?;
        debug!(url, "Opened vault database");
        Self::with_pool(pool).await
    }

    /// A private in-memory database.
    ///
    /// Pinned to a single connection that never expires, since every new
    /// connection to `:memory:` would see an empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;
        Self::with_pool(pool).await
    }

    /// Wrap an existing pool, applying the schema.
    pub async fn with_pool(pool: SqlitePool) -> Result<Self> {
        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Close the pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VaultStore for SqliteStore {
    async fn insert_key(&self, key: &Key) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vault_keys (uuid, owner_id, fingerprint, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(key.uuid.to_string())
        .bind(key.owner.0)
        .bind(key.fingerprint.as_str())
        .bind(key.created_at)
        .bind(key.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| key_write_error(e, &key.fingerprint))?;
        Ok(())
    }

    async fn get_key(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Key>> {
        sqlx::query_as::<_, KeyRow>(
            r#"
            SELECT uuid, owner_id, fingerprint, created_at, updated_at
            FROM vault_keys
            WHERE owner_id = ?1 AND uuid = ?2
            "#,
        )
        .bind(owner.0)
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Key::try_from)
        .transpose()
    }

    async fn list_keys(&self, owner: OwnerId) -> Result<Vec<Key>> {
        sqlx::query_as::<_, KeyRow>(
            r#"
            SELECT uuid, owner_id, fingerprint, created_at, updated_at
            FROM vault_keys
            WHERE owner_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Key::try_from)
        .collect()
    }

    async fn update_key(&self, key: &Key) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vault_keys
            SET fingerprint = ?1, updated_at = ?2
            WHERE owner_id = ?3 AND uuid = ?4
            "#,
        )
        .bind(key.fingerprint.as_str())
        .bind(key.updated_at)
        .bind(key.owner.0)
        .bind(key.uuid.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| key_write_error(e, &key.fingerprint))?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_key(&self, owner: OwnerId, uuid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vault_keys WHERE owner_id = ?1 AND uuid = ?2")
            .bind(owner.0)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_fingerprints(&self, owner: OwnerId) -> Result<Vec<Fingerprint>> {
        let rows: Vec<(String,)> = sqlx::query_as(
            "SELECT fingerprint FROM vault_keys WHERE owner_id = ?1 ORDER BY created_at ASC",
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|(fpr,)| {
                Fingerprint::parse(&fpr).map_err(|e| VaultError::Storage(e.to_string()))
            })
            .collect()
    }

    async fn insert_item(&self, item: &Item) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO vault_items (uuid, owner_id, name, value, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
        )
        .bind(item.uuid.to_string())
        .bind(item.owner.0)
        .bind(&item.name)
        .bind(&item.value)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_item(&self, owner: OwnerId, uuid: Uuid) -> Result<Option<Item>> {
        sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT uuid, owner_id, name, value, created_at, updated_at
            FROM vault_items
            WHERE owner_id = ?1 AND uuid = ?2
            "#,
        )
        .bind(owner.0)
        .bind(uuid.to_string())
        .fetch_optional(&self.pool)
        .await?
        .map(Item::try_from)
        .transpose()
    }

    async fn list_items(&self, owner: OwnerId) -> Result<Vec<Item>> {
        sqlx::query_as::<_, ItemRow>(
            r#"
            SELECT uuid, owner_id, name, value, created_at, updated_at
            FROM vault_items
            WHERE owner_id = ?1
            ORDER BY created_at ASC
            "#,
        )
        .bind(owner.0)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(Item::try_from)
        .collect()
    }

    async fn update_item(&self, item: &Item) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE vault_items
            SET name = ?1, value = ?2, updated_at = ?3
            WHERE owner_id = ?4 AND uuid = ?5
            "#,
        )
        .bind(&item.name)
        .bind(&item.value)
        .bind(item.updated_at)
        .bind(item.owner.0)
        .bind(item.uuid.to_string())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_item(&self, owner: OwnerId, uuid: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM vault_items WHERE owner_id = ?1 AND uuid = ?2")
            .bind(owner.0)
            .bind(uuid.to_string())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
