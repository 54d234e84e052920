//! Configuration schema definitions.

use crate::secret::SecretString;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default keyserver queried when a key is not in the local keyring.
pub const DEFAULT_KEYSERVER: &str = "hkps://keys.openpgp.org";

/// Main gpgvault configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// OpenPGP engine settings.
    #[serde(default)]
    pub gpg: GpgConfig,

    /// Persistence settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// OpenPGP engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpgConfig {
    /// Engine binary, looked up on PATH unless absolute.
    #[serde(default = "default_gpg_binary")]
    pub binary: String,

    /// Keyring home directory. Defaults to `~/.gpgvault/gnupg`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home: Option<PathBuf>,

    /// Keyserver used for imports on a local keyring miss.
    #[serde(default = "default_keyserver")]
    pub keyserver: String,

    /// Passphrase protecting the local operational keyring.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<SecretString>,

    /// Upper bound for a single engine invocation, in seconds.
    #[serde(default = "default_gpg_timeout")]
    pub timeout_secs: u64,
}

fn default_gpg_binary() -> String {
    "gpg".to_string()
}

fn default_keyserver() -> String {
    DEFAULT_KEYSERVER.to_string()
}

fn default_gpg_timeout() -> u64 {
    30
}

impl Default for GpgConfig {
    fn default() -> Self {
        Self {
            binary: default_gpg_binary(),
            home: None,
            keyserver: default_keyserver(),
            passphrase: None,
            timeout_secs: default_gpg_timeout(),
        }
    }
}

/// Persistence configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// sqlx database URL. Defaults to `sqlite://~/.gpgvault/vault.db`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database_url: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}
