//! Shared fixtures for the integration tests.

use std::path::{Path, PathBuf};

use gpgvault_core::Config;

/// Fingerprint the scripted engine reports for `CAFEBABE` (local keyring).
pub const LOCAL_FPR: &str = "D8692123C4065DEA5E0F3AB5249B39D2CAFEBABE";

/// Fingerprint the scripted engine imports for `DEADBEEF` (keyserver).
pub const REMOTE_FPR: &str = "00009999888877776666555544443333DEADBEEF";

/// Keyserver written into test configs.
pub const KEYSERVER: &str = "hkps://keys.example.org";

/// Write an executable `/bin/sh` script standing in for `gpg`.
///
/// The script reports version 2.4.4, knows one local key (`CAFEBABE`), one
/// key on the keyserver (`DEADBEEF`), and "encrypts" by echoing its arguments between armor
/// lines. Every invocation appends its mode to `calls.log` next to it.
#[cfg(unix)]
pub fn scripted_gpg(dir: &Path) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let log = dir.join("calls.log");
    let script = format!(
        r#"#!/bin/sh
for last; do :; done
case " $* " in
  *" --list-keys "*)
    echo list >> '{log}'
    [ "$last" = CAFEBABE ] || exit 2
    echo 'pub:-:255:22:249B39D2CAFEBABE:1600000000:::-:::scESC:'
    echo 'fpr:::::::::{LOCAL_FPR}:'
    ;;
  *" --recv-keys "*)
    echo recv >> '{log}'
    if [ "$last" = DEADBEEF ]; then
      echo '[GNUPG:] IMPORT_OK 1 {REMOTE_FPR}'
      echo '[GNUPG:] IMPORT_RES 1 0 1 0 0 0 0 0 0 0 0 0 0 0 0'
    else
      echo 'gpg: keyserver receive failed: No data' >&2
      exit 2
    fi
    ;;
  *" --encrypt "*)
    echo encrypt >> '{log}'
    cat > /dev/null
    echo '-----BEGIN PGP MESSAGE-----'
    echo "$@"
    echo '-----END PGP MESSAGE-----'
    ;;
  *" --version "*)
    echo 'gpg (GnuPG) 2.4.4'
    echo 'libgcrypt 1.10.3'
    ;;
  *)
    exit 2
    ;;
esac
"#,
        log = log.display(),
    );

    let path = dir.join("gpg");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Engine invocations recorded by [`scripted_gpg`], in order.
pub fn engine_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .unwrap_or_default()
        .lines()
        .map(str::to_string)
        .collect()
}

/// Config pointing every path into `dir` and the engine at `gpg`.
pub fn test_config(dir: &Path, gpg: &Path) -> Config {
    let mut config = Config::default();
    config.gpg.binary = gpg.display().to_string();
    config.gpg.home = Some(dir.join("gnupg"));
    config.gpg.keyserver = KEYSERVER.to_string();
    config.gpg.timeout_secs = 10;
    config.storage.database_url =
        Some(format!("sqlite://{}", dir.join("vault.db").display()));
    config
}
