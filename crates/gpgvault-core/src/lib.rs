//! # gpgvault-core
//!
//! Shared functionality for the gpgvault crates:
//!
//! - **Configuration**: loading, validation, and persistence of the JSON5 config file
//! - **Paths**: resolution of the vault base directory, keyring home, and database
//! - **Secrets**: a redacting string wrapper for the keyring passphrase

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::{ConfigError, Result};
pub use secret::SecretString;
