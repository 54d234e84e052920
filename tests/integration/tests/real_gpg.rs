//! Round trip through a real GnuPG installation.
//!
//! Ignored by default; run with `cargo test -- --ignored` on a machine with
//! `gpg` >= 2.1 on PATH.

#![cfg(unix)]

use std::io::Write;
use std::os::unix::fs::PermissionsExt;
use std::path::Path;
use std::process::{Command, Stdio};

use gpgvault_core::Config;
use gpgvault_store::{NewItem, OwnerId, Vault};
use tempfile::TempDir;

fn gpg(home: &Path) -> Command {
    let mut cmd = Command::new("gpg");
    cmd.arg("--homedir").arg(home).args(["--batch", "--no-tty"]);
    cmd
}

/// Generate an unprotected key in `home` and return its fingerprint.
fn generate_key(home: &Path) -> String {
    let status = gpg(home)
        .args([
            "--passphrase",
            "",
            "--quick-gen-key",
            "Vault Test <vault-test@example.org>",
            "default",
            "default",
            "never",
        ])
        .status()
        .unwrap();
    assert!(status.success());

    let listing = gpg(home)
        .args(["--list-keys", "--with-colons", "--fingerprint", "vault-test@example.org"])
        .output()
        .unwrap();
    String::from_utf8(listing.stdout)
        .unwrap()
        .lines()
        .find(|l| l.starts_with("fpr:"))
        .and_then(|l| l.split(':').nth(9))
        .unwrap()
        .to_string()
}

#[tokio::test]
#[ignore = "requires gpg on PATH"]
async fn test_encrypted_item_decrypts_with_owner_key() {
    let dir = TempDir::new().unwrap();
    let home = dir.path().join("gnupg");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::set_permissions(&home, std::fs::Permissions::from_mode(0o700)).unwrap();
    let fingerprint = generate_key(&home);

    let mut config = Config::default();
    config.gpg.home = Some(home.clone());
    config.gpg.keyserver = "hkps://keys.invalid".to_string();
    config.storage.database_url =
        Some(format!("sqlite://{}", dir.path().join("vault.db").display()));
    let vault = Vault::from_config(&config).await.unwrap();

    // Short id of the generated key resolves locally
    let short_id = &fingerprint[32..];
    let key = vault.register_key(OwnerId(1), short_id).await.unwrap();
    assert_eq!(key.fingerprint.as_str(), fingerprint);

    let item = vault
        .create_item(OwnerId(1), NewItem::plaintext("token", "s3cr3t value"))
        .await
        .unwrap();
    assert_ne!(item.value, b"s3cr3t value");
    assert!(gpgvault_gpg::is_armored_message(&item.value));

    let mut child = gpg(&home)
        .args(["--pinentry-mode", "loopback", "--passphrase", "", "--decrypt"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .unwrap();
    child.stdin.take().unwrap().write_all(&item.value).unwrap();
    let output = child.wait_with_output().unwrap();

    assert!(output.status.success());
    assert_eq!(output.stdout, b"s3cr3t value");
}
