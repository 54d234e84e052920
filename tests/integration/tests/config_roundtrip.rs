//! Config save/load roundtrip integration tests.
//!
//! These tests verify that configuration can be serialized, written to disk,
//! and loaded back with identical field values.

use gpgvault_core::config::{Config, LogLevel, DEFAULT_KEYSERVER};
use gpgvault_core::{ConfigError, SecretString};
use std::path::Path;
use tempfile::TempDir;

#[test]
fn test_config_save_and_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gpgvault.json5");

    let config = Config::default();
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gpg.binary, config.gpg.binary);
    assert_eq!(loaded.gpg.keyserver, DEFAULT_KEYSERVER);
    assert_eq!(loaded.gpg.timeout_secs, config.gpg.timeout_secs);
    assert!(loaded.gpg.passphrase.is_none());
    assert!(loaded.storage.database_url.is_none());
}

#[test]
fn test_config_modify_and_reload() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gpgvault.json5");

    let mut config = Config::default();
    config.gpg.keyserver = "hkps://keyserver.ubuntu.com".to_string();
    config.gpg.passphrase = Some(SecretString::new("correct horse"));
    config.logging.level = LogLevel::Debug;
    config.save(&path).unwrap();

    let loaded = Config::load(&path).unwrap();
    assert_eq!(loaded.gpg.keyserver, "hkps://keyserver.ubuntu.com");
    assert_eq!(
        loaded.gpg.passphrase.as_ref().map(|p| p.expose_secret()),
        Some("correct horse")
    );
    assert_eq!(loaded.logging.level, LogLevel::Debug);
    assert!(loaded.validate().is_ok());
}

#[cfg(unix)]
#[test]
fn test_saved_config_is_private() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let path = dir.path().join("nested").join("gpgvault.json5");
    Config::default().save(&path).unwrap();

    let mode = std::fs::metadata(&path).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o600);
}

#[test]
fn test_json5_comments_and_partial_sections() {
    let config = Config::parse(
        r#"{
            // only override what differs
            gpg: { keyserver: "hkp://localhost:11371", timeout_secs: 5 },
        }"#,
    )
    .unwrap();

    assert_eq!(config.gpg.keyserver, "hkp://localhost:11371");
    assert_eq!(config.gpg.timeout_secs, 5);
    assert_eq!(config.gpg.binary, "gpg");
    assert_eq!(config.logging.level, LogLevel::Info);
}

#[test]
fn test_config_load_nonexistent() {
    let result = Config::load(Path::new("/nonexistent/gpgvault.json5"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
fn test_config_parse_invalid() {
    let result = Config::parse("not valid json");
    assert!(result.is_err());
}

#[test]
fn test_resolve_rejects_broken_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gpgvault.json5");
    std::fs::write(&path, "{ gpg: ").unwrap();

    assert!(Config::resolve(Some(&path)).is_err());
}
