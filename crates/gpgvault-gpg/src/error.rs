//! Engine error types.

use std::io;
use thiserror::Error;

/// Errors that can occur while resolving keys or encrypting.
#[derive(Debug, Error)]
pub enum GpgError {
    /// Identifier does not match the 8/16/40 hex pattern.
    #[error(
        "Invalid key id '{0}': enter a valid PGP/GPG key id with either 8, 16 or 40 characters and an optional 0x prefix"
    )]
    InvalidFormat(String),

    /// Engine reported something that is not a 40 hex fingerprint.
    #[error("Invalid fingerprint: {0}")]
    InvalidFingerprint(String),

    /// Neither the local keyring nor the keyserver knows the key.
    #[error("No key for id 0x{key_id} found on {keyserver}")]
    KeyNotFound { key_id: String, keyserver: String },

    /// Encryption was requested for an empty recipient set.
    #[error("No recipients: register at least one key before storing values")]
    NoRecipients,

    /// The engine failed to produce ciphertext.
    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    /// The engine process could not be run or exited abnormally.
    #[error("Engine execution failed: {0}")]
    ExecutionFailed(String),

    /// The engine did not finish within the configured budget.
    #[error("Engine timed out after {0} seconds")]
    Timeout(u64),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl GpgError {
    /// Create a new execution failed error.
    pub fn execution_failed(msg: impl Into<String>) -> Self {
        Self::ExecutionFailed(msg.into())
    }

    /// Create a new encryption failed error.
    pub fn encryption_failed(msg: impl Into<String>) -> Self {
        Self::EncryptionFailed(msg.into())
    }
}
