//! Path resolution utilities.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Get the gpgvault base directory (~/.gpgvault).
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    let home = dirs::home_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine home directory".to_string())
    })?;
    Ok(home.join(".gpgvault"))
}

/// Get the main config file path (~/.gpgvault/gpgvault.json5).
pub fn config_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("gpgvault.json5"))
}

/// Get the default keyring home directory (~/.gpgvault/gnupg).
pub fn keyring_dir() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("gnupg"))
}

/// Get the default SQLite database path (~/.gpgvault/vault.db).
pub fn database_file() -> Result<PathBuf, ConfigError> {
    Ok(base_dir()?.join("vault.db"))
}

/// Ensure the keyring home exists.
///
/// GnuPG refuses to work with a group- or world-readable home, so the keyring
/// directory is created with mode 0700 on Unix.
pub fn ensure_keyring_dir(keyring: &Path) -> Result<(), ConfigError> {
    std::fs::create_dir_all(keyring)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(keyring, std::fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
