//! Environment variable handling.

use std::env;

/// Environment variables recognized by gpgvault.
pub mod vars {
    /// Override for the config file path.
    pub const CONFIG: &str = "GPGVAULT_CONFIG";
    /// Override for the keyring home directory.
    pub const GNUPGHOME: &str = "GPGVAULT_GNUPGHOME";
    /// Override for the keyserver address.
    pub const KEYSERVER: &str = "GPGVAULT_KEYSERVER";
    /// Passphrase protecting the local operational keyring.
    pub const PASSPHRASE: &str = "GPGVAULT_PASSPHRASE";
    /// Override for the storage database URL.
    pub const DATABASE_URL: &str = "GPGVAULT_DATABASE_URL";
    /// Override for the engine timeout in seconds.
    pub const GPG_TIMEOUT: &str = "GPGVAULT_GPG_TIMEOUT";
    /// Acting owner id for the command-line client.
    pub const OWNER: &str = "GPGVAULT_OWNER";
}

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

/// Get an environment variable as a u64.
pub fn get_u64(name: &str) -> Option<u64> {
    get_var(name).and_then(|v| v.trim().parse().ok())
}
