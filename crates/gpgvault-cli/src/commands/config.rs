//! Configuration management commands.

use std::path::{Path, PathBuf};

use clap::Args;
use gpgvault_core::config::Config;
use gpgvault_core::paths;

/// Config command arguments.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(clap::Subcommand)]
pub enum ConfigCommand {
    /// Show the effective configuration (passphrase redacted)
    Show,

    /// Show configuration file path
    Path,

    /// Initialize configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// Run the config command. `path` is the `--config` override, if any.
pub async fn run(args: ConfigArgs, path: Option<&Path>) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show => {
            let config = Config::resolve(path)?;
            println!("{}", serde_json::to_string_pretty(&redacted(&config)?)?);
        }

        ConfigCommand::Path => {
            println!("{}", config_path(path)?.display());
        }

        ConfigCommand::Init { force } => {
            let path = config_path(path)?;

            if path.exists() && !force {
                anyhow::bail!(
                    "Config file already exists: {:?}. Use --force to overwrite.",
                    path
                );
            }

            let config = Config::default();
            paths::ensure_keyring_dir(&config.keyring_home()?)?;
            config.save(&path)?;

            println!("Created config file: {:?}", path);
        }

        ConfigCommand::Validate => {
            let config = Config::resolve(path)
                .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;
            match config.validate() {
                Ok(_) => println!("Configuration is valid"),
                Err(e) => anyhow::bail!("{}", e),
            }
        }
    }

    Ok(())
}

fn config_path(path: Option<&Path>) -> anyhow::Result<PathBuf> {
    match path {
        Some(p) => Ok(p.to_path_buf()),
        None => Ok(paths::config_file()?),
    }
}

/// JSON view of `config` with the passphrase masked.
fn redacted(config: &Config) -> anyhow::Result<serde_json::Value> {
    let mut json = serde_json::to_value(config)?;
    if let Some(passphrase) = json.pointer_mut("/gpg/passphrase") {
        *passphrase = serde_json::Value::String("[REDACTED]".to_string());
    }
    Ok(json)
}
