//! End-to-end vault tests against a scripted `gpg` and an on-disk database.
//!
//! The engine is a shell script (see `scripted_gpg`), so these run without
//! GnuPG installed while still exercising process spawning, colon-listing
//! and status-line parsing, and SQLite persistence.

#![cfg(unix)]

use gpgvault_gpg::is_armored_message;
use gpgvault_integration_tests::{
    engine_calls, scripted_gpg, test_config, KEYSERVER, LOCAL_FPR, REMOTE_FPR,
};
use gpgvault_core::SecretString;
use gpgvault_store::{ItemUpdate, NewItem, OwnerId, Vault, VaultError};
use tempfile::TempDir;

const ALICE: OwnerId = OwnerId(1);
const BOB: OwnerId = OwnerId(2);

async fn open(dir: &TempDir) -> Vault {
    let gpg = scripted_gpg(dir.path());
    Vault::from_config(&test_config(dir.path(), &gpg))
        .await
        .unwrap()
}

#[tokio::test]
async fn test_from_config_creates_private_keyring_home() {
    use std::os::unix::fs::PermissionsExt;

    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;
    assert_eq!(vault.keyserver(), KEYSERVER);

    let mode = std::fs::metadata(dir.path().join("gnupg"))
        .unwrap()
        .permissions()
        .mode();
    assert_eq!(mode & 0o777, 0o700);
    assert!(dir.path().join("vault.db").exists());
}

#[tokio::test]
async fn test_multiline_passphrase_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    let gpg = scripted_gpg(dir.path());
    let mut config = test_config(dir.path(), &gpg);
    config.gpg.passphrase = Some(SecretString::new("pw\nINJECTED"));

    let err = Vault::from_config(&config).await.err().unwrap();
    assert!(matches!(err, VaultError::Config(_)));
    assert!(err.to_string().contains("single line"));
    assert!(!dir.path().join("gnupg").exists());
    assert!(!dir.path().join("vault.db").exists());
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_zero_timeout_refuses_to_open() {
    let dir = TempDir::new().unwrap();
    let gpg = scripted_gpg(dir.path());
    let mut config = test_config(dir.path(), &gpg);
    config.gpg.timeout_secs = 0;

    let err = Vault::from_config(&config).await.err().unwrap();
    assert!(err.to_string().contains("timeout_secs"));
}

#[tokio::test]
async fn test_register_local_then_remote() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;

    let local = vault.register_key(ALICE, "0xCAFEBABE").await.unwrap();
    assert_eq!(local.fingerprint.as_str(), LOCAL_FPR);
    assert_eq!(engine_calls(dir.path()), vec!["list"]);

    let remote = vault.register_key(ALICE, "DEADBEEF").await.unwrap();
    assert_eq!(remote.fingerprint.as_str(), REMOTE_FPR);
    assert_eq!(engine_calls(dir.path()), vec!["list", "list", "recv"]);

    let fprs: Vec<String> = vault
        .list_fingerprints(ALICE)
        .await
        .unwrap()
        .iter()
        .map(|f| f.to_string())
        .collect();
    assert_eq!(fprs.len(), 2);
    assert!(fprs.contains(&LOCAL_FPR.to_string()));
    assert!(fprs.contains(&REMOTE_FPR.to_string()));
}

#[tokio::test]
async fn test_unknown_key_reports_keyserver() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;

    let err = vault.register_key(ALICE, "0x0123456789ABCDEF").await.unwrap_err();
    assert_eq!(
        err.to_string(),
        format!("The given key 0x0123456789ABCDEF could not be found on {KEYSERVER}")
    );
    assert_eq!(engine_calls(dir.path()), vec!["list", "recv"]);
}

#[tokio::test]
async fn test_invalid_identifier_never_reaches_engine() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;

    let err = vault.register_key(ALICE, "0xCAFE").await.unwrap_err();
    assert!(matches!(err, VaultError::InvalidFormat(_)));
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_duplicate_registration_is_per_owner() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;

    vault.register_key(ALICE, "CAFEBABE").await.unwrap();
    assert!(matches!(
        vault.register_key(ALICE, "0xCAFEBABE").await,
        Err(VaultError::DuplicateKey(_))
    ));
    vault.register_key(BOB, "CAFEBABE").await.unwrap();
}

#[tokio::test]
async fn test_item_encrypted_for_every_registered_key() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;
    vault.register_key(ALICE, "CAFEBABE").await.unwrap();
    vault.register_key(ALICE, "DEADBEEF").await.unwrap();

    let item = vault
        .create_item(ALICE, NewItem::plaintext("github token", "ghp_secret"))
        .await
        .unwrap();

    let stored = String::from_utf8(item.value.clone()).unwrap();
    assert!(is_armored_message(&item.value));
    assert!(!stored.contains("ghp_secret"));
    assert!(stored.contains(&format!("--recipient {LOCAL_FPR}")));
    assert!(stored.contains(&format!("--recipient {REMOTE_FPR}")));

    // Survives a reopen of the database
    let reopened = open(&dir).await;
    let loaded = reopened.get_item(ALICE, item.uuid).await.unwrap();
    assert_eq!(loaded.value, item.value);
    assert_eq!(loaded.name, "github token");
}

#[tokio::test]
async fn test_pre_encrypted_value_stored_verbatim() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;
    let sealed = b"-----BEGIN PGP MESSAGE-----\n\nhQEMA...\n-----END PGP MESSAGE-----\n".to_vec();

    let item = vault
        .create_item(ALICE, NewItem::encrypted("backup", sealed.clone()))
        .await
        .unwrap();

    assert_eq!(item.value, sealed);
    assert!(engine_calls(dir.path()).is_empty());
}

#[tokio::test]
async fn test_removing_key_keeps_items_and_narrows_recipients() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;
    let local = vault.register_key(ALICE, "CAFEBABE").await.unwrap();
    vault.register_key(ALICE, "DEADBEEF").await.unwrap();

    let item = vault
        .create_item(ALICE, NewItem::plaintext("db", "one"))
        .await
        .unwrap();
    vault.remove_key(ALICE, local.uuid).await.unwrap();

    // Existing ciphertext is untouched
    assert_eq!(vault.get_item(ALICE, item.uuid).await.unwrap().value, item.value);

    // New writes only go to the remaining key
    let updated = vault
        .update_item(ALICE, item.uuid, ItemUpdate::plaintext("two"))
        .await
        .unwrap();
    let stored = String::from_utf8(updated.value).unwrap();
    assert!(stored.contains(REMOTE_FPR));
    assert!(!stored.contains(LOCAL_FPR));
}

#[tokio::test]
async fn test_owners_cannot_see_each_other() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;
    let key = vault.register_key(ALICE, "CAFEBABE").await.unwrap();
    let item = vault
        .create_item(ALICE, NewItem::plaintext("db", "x"))
        .await
        .unwrap();

    assert!(vault.list_keys(BOB).await.unwrap().is_empty());
    assert!(vault.list_items(BOB).await.unwrap().is_empty());
    assert!(matches!(vault.get_key(BOB, key.uuid).await, Err(VaultError::NotFound(_))));
    assert!(matches!(
        vault
            .update_item(BOB, item.uuid, ItemUpdate::encrypted("x"))
            .await,
        Err(VaultError::NotFound(_))
    ));
    assert!(matches!(
        vault.delete_item(BOB, item.uuid).await,
        Err(VaultError::NotFound(_))
    ));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_on_disk() {
    let dir = TempDir::new().unwrap();
    let vault = open(&dir).await;

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let vault = vault.clone();
            tokio::spawn(async move { vault.register_key(ALICE, "CAFEBABE").await })
        })
        .collect();

    let mut ok = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => ok += 1,
            Err(VaultError::DuplicateKey(_)) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(ok, 1);
    assert_eq!(vault.list_keys(ALICE).await.unwrap().len(), 1);
}
