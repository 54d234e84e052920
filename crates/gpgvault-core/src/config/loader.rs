//! Configuration loading and persistence.

use super::Config;
use crate::env;
use crate::error::ConfigError;
use crate::paths;
use crate::secret::SecretString;
use std::fs;
use std::path::{Path, PathBuf};

impl Config {
    /// Load configuration from the default path.
    pub fn load_default() -> Result<Self, ConfigError> {
        let path = paths::config_file()?;
        Self::load(&path)
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Load from `path` (or the default location), falling back to defaults
    /// when no file exists, then apply environment overrides.
    ///
    /// A file that exists but fails to parse is an error rather than a
    /// silent fallback, so a typo cannot drop the configured keyserver.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        let loaded = match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        };

        let mut config = match loaded {
            Ok(config) => config,
            Err(ConfigError::NotFound(p)) => {
                tracing::debug!(path = %p.display(), "no config file, using defaults");
                Self::default()
            }
            Err(e) => return Err(e),
        };

        config.apply_env();
        Ok(config)
    }

    /// Apply `GPGVAULT_*` environment overrides.
    pub fn apply_env(&mut self) {
        if let Some(home) = env::get_var(env::vars::GNUPGHOME) {
            self.gpg.home = Some(paths::expand_tilde(&home));
        }
        if let Some(keyserver) = env::get_var(env::vars::KEYSERVER) {
            self.gpg.keyserver = keyserver;
        }
        if let Some(passphrase) = env::get_var(env::vars::PASSPHRASE) {
            self.gpg.passphrase = Some(SecretString::new(passphrase));
        }
        if let Some(timeout) = env::get_u64(env::vars::GPG_TIMEOUT) {
            self.gpg.timeout_secs = timeout;
        }
        if let Some(url) = env::get_var(env::vars::DATABASE_URL) {
            self.storage.database_url = Some(url);
        }
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;

        // The file may carry the keyring passphrase
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&temp_path, fs::Permissions::from_mode(0o600))?;
        }

        fs::rename(&temp_path, path)?;
        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 has no serializer; plain JSON is valid JSON5
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        if self.gpg.binary.trim().is_empty() {
            errors.push("gpg.binary must not be empty".to_string());
        }

        if self.gpg.keyserver.trim().is_empty() {
            errors.push("gpg.keyserver must not be empty".to_string());
        } else if !self.gpg.keyserver.contains("://") {
            errors.push(format!(
                "gpg.keyserver '{}' must include a scheme (e.g. hkps://)",
                self.gpg.keyserver
            ));
        }

        if self.gpg.timeout_secs == 0 {
            errors.push("gpg.timeout_secs must be greater than 0".to_string());
        }

        if let Some(passphrase) = &self.gpg.passphrase {
            if passphrase.expose_secret().contains(['\n', '\r']) {
                errors.push("gpg.passphrase must be a single line".to_string());
            }
        }

        if let Some(url) = &self.storage.database_url {
            if !url.starts_with("sqlite:") {
                errors.push(format!(
                    "storage.database_url '{}' is not a sqlite URL",
                    url
                ));
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Keyring home directory, falling back to `~/.gpgvault/gnupg`.
    pub fn keyring_home(&self) -> Result<PathBuf, ConfigError> {
        match &self.gpg.home {
            Some(home) => Ok(paths::expand_tilde(&home.to_string_lossy())),
            None => paths::keyring_dir(),
        }
    }

    /// Database URL, falling back to the SQLite file in the base directory.
    ///
    /// A leading `~/` in the path part is expanded like `gpg.home`.
    pub fn database_url(&self) -> Result<String, ConfigError> {
        match &self.storage.database_url {
            Some(url) => {
                let (scheme, path) = match url.strip_prefix("sqlite://") {
                    Some(path) => ("sqlite://", path),
                    None => ("sqlite:", url.strip_prefix("sqlite:").unwrap_or(url)),
                };
                if path.starts_with("~/") {
                    Ok(format!("{scheme}{}", paths::expand_tilde(path).display()))
                } else {
                    Ok(url.clone())
                }
            }
            None => Ok(format!("sqlite://{}", paths::database_file()?.display())),
        }
    }
}
