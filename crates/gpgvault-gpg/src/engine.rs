//! The `gpg` backed engine.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use gpgvault_core::config::GpgConfig;
use gpgvault_core::SecretString;
use tracing::{debug, warn};

use crate::command::GpgCommand;
use crate::error::GpgError;
use crate::fingerprint::Fingerprint;
use crate::keyid::KeyId;
use crate::keyring::{Encryptor, Keyring};
use crate::parse::{self, ImportResult};
use crate::Result;

/// Header every armored ciphertext starts with.
pub const PGP_MESSAGE_HEADER: &str = "-----BEGIN PGP MESSAGE-----";

/// Whether `value` looks like armored OpenPGP ciphertext.
pub fn is_armored_message(value: &[u8]) -> bool {
    let start = value
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(value.len());
    value[start..].starts_with(PGP_MESSAGE_HEADER.as_bytes())
}

/// OpenPGP engine driving the `gpg` binary against one keyring home.
///
/// Recipients are trusted unconditionally (`--trust-model always`): being in
/// an owner's registry is the trust decision, not the web of trust.
#[derive(Debug, Clone)]
pub struct Gnupg {
    command: GpgCommand,
    passphrase: Option<SecretString>,
}

impl Gnupg {
    /// Create an engine around an existing command runner.
    pub fn new(command: GpgCommand) -> Self {
        Self {
            command,
            passphrase: None,
        }
    }

    /// Build from configuration with the keyring at `homedir`.
    pub fn from_config(config: &GpgConfig, homedir: impl Into<PathBuf>) -> Self {
        let command = GpgCommand::new(&config.binary, homedir)
            .with_timeout(Duration::from_secs(config.timeout_secs));
        Self {
            command,
            passphrase: config.passphrase.clone(),
        }
    }

    /// Set the passphrase protecting the local operational keyring.
    pub fn with_passphrase(mut self, passphrase: SecretString) -> Self {
        self.passphrase = Some(passphrase);
        self
    }

    /// Engine version line, e.g. `gpg (GnuPG) 2.4.4`.
    pub async fn version(&self) -> Result<String> {
        let output = self.command.run(&["--version".to_string()], None).await?;
        if !output.success() {
            return Err(GpgError::execution_failed(output.stderr_summary().to_string()));
        }
        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string())
    }

    /// Arguments and stdin prefix carrying the passphrase, if configured.
    ///
    /// gpg reads one line from the passphrase fd and treats the rest of the
    /// stream as plaintext, so a line break inside the passphrase is refused.
    fn passphrase_input(&self) -> Result<(Vec<String>, Vec<u8>)> {
        match &self.passphrase {
            Some(passphrase) if !passphrase.is_empty() => {
                if passphrase.expose_secret().contains(['\n', '\r']) {
                    return Err(GpgError::encryption_failed(
                        "configured passphrase contains a line break",
                    ));
                }
                let args = ["--pinentry-mode", "loopback", "--passphrase-fd", "0"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect();
                let mut line = passphrase.expose_secret().as_bytes().to_vec();
                line.push(b'\n');
                Ok((args, line))
            }
            _ => Ok((Vec::new(), Vec::new())),
        }
    }
}

fn owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl Keyring for Gnupg {
    async fn list_keys(&self, key_id: &KeyId) -> Result<Vec<Fingerprint>> {
        let mut args = owned(&[
            "--list-keys",
            "--fixed-list-mode",
            "--fingerprint",
            "--with-colons",
            "--list-options",
            "no-show-photos",
        ]);
        args.push(key_id.to_string());

        let output = self.command.run(&args, None).await?;

        // gpg exits 2 with "No public key" when nothing matches
        if !output.success() {
            debug!(%key_id, stderr = output.stderr_summary(), "no local match");
            return Ok(Vec::new());
        }

        Ok(parse::primary_fingerprints(&String::from_utf8_lossy(
            &output.stdout,
        )))
    }

    async fn receive_keys(&self, keyserver: &str, key_id: &KeyId) -> Result<ImportResult> {
        let mut args = owned(&["--status-fd", "1", "--keyserver"]);
        args.push(keyserver.to_string());
        args.push("--recv-keys".to_string());
        args.push(key_id.to_string());

        let output = self.command.run(&args, None).await?;
        let result = parse::import_result(output.status_lines());

        if !output.success() && result.count == 0 {
            // A miss on the keyserver also exits non-zero; the count decides
            warn!(
                %key_id,
                keyserver,
                exit_code = output.exit_code,
                stderr = output.stderr_summary(),
                "keyserver receive imported nothing"
            );
        }

        Ok(result)
    }
}

#[async_trait]
impl Encryptor for Gnupg {
    async fn encrypt(&self, plaintext: &[u8], recipients: &[Fingerprint]) -> Result<Vec<u8>> {
        if recipients.is_empty() {
            return Err(GpgError::NoRecipients);
        }

        let (mut args, mut stdin) = self.passphrase_input()?;
        args.extend(owned(&[
            "--yes",
            "--encrypt",
            "--armor",
            "--trust-model",
            "always",
        ]));
        for fpr in recipients {
            args.push("--recipient".to_string());
            args.push(fpr.to_string());
        }
        stdin.extend_from_slice(plaintext);

        let output = self.command.run(&args, Some(stdin)).await.map_err(|e| match e {
            GpgError::Timeout(_) | GpgError::ExecutionFailed(_) | GpgError::Io(_) => {
                GpgError::encryption_failed(e.to_string())
            }
            other => other,
        })?;

        if !output.success() {
            return Err(GpgError::encryption_failed(format!(
                "gpg exited with {}: {}",
                output.exit_code,
                output.stderr_summary()
            )));
        }
        if output.stdout.is_empty() {
            return Err(GpgError::encryption_failed("gpg produced no output"));
        }

        debug!(
            recipients = recipients.len(),
            bytes = output.stdout.len(),
            "encrypted value"
        );
        Ok(output.stdout)
    }
}
