//! Owner-scoped key registry and encrypted item storage.
//!
//! Owners register public keys by id or fingerprint; item values are
//! encrypted for every key the owner holds at write time. Records persist
//! through a [`VaultStore`], with SQLite and in-memory backends.

pub mod codec;
pub mod error;
pub mod sqlite;
pub mod store;
pub mod types;
pub mod vault;

pub use codec::{decode_value, encode_value};
pub use error::{Result, VaultError};
pub use sqlite::SqliteStore;
pub use store::{MemoryStore, VaultStore};
pub use types::{Item, ItemUpdate, Key, NewItem, OwnerId, MAX_ITEM_NAME_LEN};
pub use vault::Vault;
