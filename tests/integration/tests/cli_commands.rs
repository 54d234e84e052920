//! CLI routing tests.
//!
//! Commands are parsed and run in-process against a config file that points
//! the vault at a scripted engine and a temporary database.

#![cfg(unix)]

use clap::Parser;
use gpgvault_cli::{engine_version, run, Cli};
use gpgvault_core::Config;
use gpgvault_integration_tests::{engine_calls, scripted_gpg, test_config};
use gpgvault_store::{OwnerId, Vault};
use std::path::PathBuf;
use tempfile::TempDir;

/// Write a config for `dir` and return its path.
fn setup(dir: &TempDir) -> PathBuf {
    let gpg = scripted_gpg(dir.path());
    let path = dir.path().join("gpgvault.json5");
    test_config(dir.path(), &gpg).save(&path).unwrap();
    path
}

async fn gpgvault(config: &PathBuf, args: &[&str]) -> anyhow::Result<()> {
    let mut argv = vec!["gpgvault", "--config", config.to_str().unwrap()];
    argv.extend_from_slice(args);
    run(Cli::try_parse_from(argv)?).await
}

async fn vault(config: &PathBuf) -> Vault {
    Vault::from_config(&Config::load(config).unwrap()).await.unwrap()
}

#[tokio::test]
async fn test_version() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);
    gpgvault(&config, &["version"]).await.unwrap();

    let config = Config::load(&config).unwrap();
    assert_eq!(engine_version(&config).await.unwrap(), "gpg (GnuPG) 2.4.4");
}

#[tokio::test]
async fn test_version_survives_missing_engine() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("gpgvault.json5");
    let mut config = test_config(dir.path(), &dir.path().join("absent-gpg"));
    config.gpg.timeout_secs = 2;
    config.save(&path).unwrap();

    gpgvault(&path, &["version"]).await.unwrap();
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_key_add_and_item_add() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    gpgvault(&config, &["--owner", "5", "key", "add", "0xCAFEBABE"])
        .await
        .unwrap();
    gpgvault(&config, &["--owner", "5", "item", "add", "db", "--value", "hunter2"])
        .await
        .unwrap();
    gpgvault(&config, &["--owner", "5", "item", "list"]).await.unwrap();

    let vault = vault(&config).await;
    assert_eq!(vault.list_fingerprints(OwnerId(5)).await.unwrap().len(), 1);
    let items = vault.list_items(OwnerId(5)).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_ne!(items[0].value, b"hunter2");
    assert_eq!(engine_calls(dir.path()), vec!["list", "encrypt"]);
}

#[tokio::test]
async fn test_item_add_encrypted_base64() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    // "-----BEGIN PGP MESSAGE-----\n" in base64
    gpgvault(
        &config,
        &[
            "item",
            "add",
            "backup",
            "--encrypted",
            "--value-base64",
            "LS0tLS1CRUdJTiBQR1AgTUVTU0FHRS0tLS0tCg==",
        ],
    )
    .await
    .unwrap();

    let items = vault(&config).await.list_items(OwnerId(1)).await.unwrap();
    assert_eq!(items[0].value, b"-----BEGIN PGP MESSAGE-----\n");
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_item_add_rejects_bad_base64() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    let err = gpgvault(
        &config,
        &["item", "add", "x", "--encrypted", "--value-base64", "%%%"],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("Invalid base 64 encoded string."));
}

#[tokio::test]
async fn test_item_add_without_keys_fails() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    let err = gpgvault(&config, &["item", "add", "db", "--value", "x"])
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Encryption failed"));
}

#[tokio::test]
async fn test_item_add_with_multiline_passphrase_fails() {
    let dir = TempDir::new().unwrap();
    let gpg = scripted_gpg(dir.path());
    let path = dir.path().join("gpgvault.json5");
    let mut config = test_config(dir.path(), &gpg);
    config.gpg.passphrase = Some(gpgvault_core::SecretString::new("pw\nINJECTED"));
    config.save(&path).unwrap();

    let err = gpgvault(&path, &["item", "add", "db", "--value", "secret"])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("single line"));
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_key_remove_unknown_is_not_found() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    let err = gpgvault(
        &config,
        &["key", "remove", "3f1c2a4e-8d0b-4a57-9a57-1d2f3c4b5a69"],
    )
    .await
    .unwrap_err();
    assert!(err.to_string().starts_with("Not found"));
}

#[tokio::test]
async fn test_config_validate_and_show() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    gpgvault(&config, &["config", "validate"]).await.unwrap();
    gpgvault(&config, &["config", "show"]).await.unwrap();
    gpgvault(&config, &["config", "path"]).await.unwrap();
}

#[tokio::test]
async fn test_config_init_refuses_overwrite() {
    let dir = TempDir::new().unwrap();
    let config = setup(&dir);

    let err = gpgvault(&config, &["config", "init"]).await.unwrap_err();
    assert!(err.to_string().contains("already exists"));
}
