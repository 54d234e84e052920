//! OpenPGP engine orchestration for gpgvault.
//!
//! This crate provides the key pipeline in front of the external `gpg` binary:
//! - Key id normalization and fingerprint presentation
//! - Resolution of key ids via the local keyring or a keyserver
//! - Armored public-key encryption for a recipient set

pub mod command;
pub mod engine;
pub mod error;
pub mod fingerprint;
pub mod keyid;
pub mod keyring;
pub mod parse;
pub mod resolver;

pub use command::{GpgCommand, GpgOutput};
pub use engine::{is_armored_message, Gnupg, PGP_MESSAGE_HEADER};
pub use error::GpgError;
pub use fingerprint::{prettify_fingerprint, Fingerprint, NO_FINGERPRINT};
pub use keyid::{KeyId, KeyIdKind};
pub use keyring::{Encryptor, Keyring};
pub use parse::ImportResult;
pub use resolver::KeyResolver;

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, GpgError>;
