//! Error types for the vault.

use gpgvault_core::ConfigError;
use gpgvault_gpg::GpgError;
use thiserror::Error;

/// Errors that can occur during vault operations.
#[derive(Debug, Error)]
pub enum VaultError {
    /// Key identifier failed the id/fingerprint pattern.
    #[error("{0}")]
    InvalidFormat(String),

    /// Neither the local keyring nor the keyserver knows the key.
    #[error("The given key 0x{key_id} could not be found on {keyserver}")]
    KeyNotFound { key_id: String, keyserver: String },

    /// The owner already registered this fingerprint.
    #[error("Key {0} is already registered")]
    DuplicateKey(String),

    /// The engine could not encrypt the value; nothing was stored.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// A submitted value was not valid base64.
    #[error("Malformed value: {0}")]
    MalformedCiphertext(String),

    /// Field validation failed.
    #[error("Validation error: {0}")]
    Validation(String),

    /// No such record for this owner.
    #[error("Not found: {0}")]
    NotFound(String),

    /// The engine failed during key resolution.
    #[error("Engine error: {0}")]
    Engine(String),

    /// Stored data could not be interpreted.
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl VaultError {
    /// Whether the caller can fix this by changing the request.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidFormat(_)
                | Self::KeyNotFound { .. }
                | Self::DuplicateKey(_)
                | Self::MalformedCiphertext(_)
                | Self::Validation(_)
                | Self::NotFound(_)
        )
    }
}

impl From<GpgError> for VaultError {
    fn from(err: GpgError) -> Self {
        match err {
            GpgError::InvalidFormat(_) => Self::InvalidFormat(err.to_string()),
            GpgError::KeyNotFound { key_id, keyserver } => Self::KeyNotFound { key_id, keyserver },
            GpgError::NoRecipients => Self::EncryptionFailed(err.to_string()),
            GpgError::EncryptionFailed(msg) => Self::EncryptionFailed(msg),
            other => Self::Engine(other.to_string()),
        }
    }
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
