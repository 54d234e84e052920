//! gpgvault command-line interface.

pub mod commands;
pub mod logging;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use gpgvault_core::Config;
use gpgvault_gpg::Gnupg;
use gpgvault_store::{OwnerId, Vault, VaultError};
use tracing::{debug, error, warn};

/// gpgvault - secrets encrypted to your own OpenPGP keys
#[derive(Parser)]
#[command(name = "gpgvault")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase logging verbosity
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true, env = "GPGVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Owner the command acts for
    #[arg(long, global = true, env = "GPGVAULT_OWNER", default_value_t = 1)]
    pub owner: i64,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Manage the owner's public keys
    Key(commands::key::KeyArgs),

    /// Manage encrypted items
    Item(commands::item::ItemArgs),

    /// Configuration management
    Config(commands::config::ConfigArgs),

    /// Show version information
    Version,
}

/// State shared by the vault-backed commands.
pub struct Context {
    pub config: Config,
    pub owner: OwnerId,
}

impl Context {
    /// Open the vault described by the configuration.
    pub async fn vault(&self) -> anyhow::Result<Vault> {
        Ok(Vault::from_config(&self.config).await?)
    }
}

/// Run the CLI with the given arguments.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let result = dispatch(cli).await;
    if let Err(err) = &result {
        log_failure(err);
    }
    result
}

/// Rejected requests are expected; anything else is logged as a failure.
fn log_failure(err: &anyhow::Error) {
    match err.downcast_ref::<VaultError>() {
        Some(e) if e.is_user_error() => debug!(error = %e, "Request rejected"),
        _ => error!("Command failed: {err:#}"),
    }
}

/// Version line of the configured `gpg` engine.
pub async fn engine_version(config: &Config) -> anyhow::Result<String> {
    let gnupg = Gnupg::from_config(&config.gpg, config.keyring_home()?);
    Ok(gnupg.version().await?)
}

async fn version(config_path: Option<&Path>) -> anyhow::Result<()> {
    println!("gpgvault {}", env!("CARGO_PKG_VERSION"));

    let engine = match Config::resolve(config_path) {
        Ok(config) => engine_version(&config).await,
        Err(e) => Err(e.into()),
    };
    match engine {
        Ok(line) => println!("engine: {line}"),
        Err(e) => {
            warn!(error = %e, "Engine version unavailable");
            println!("engine: unavailable");
        }
    }
    Ok(())
}

async fn dispatch(cli: Cli) -> anyhow::Result<()> {
    debug!(owner = cli.owner, "Dispatching command");
    match cli.command {
        Commands::Config(args) => commands::config::run(args, cli.config.as_deref()).await,
        Commands::Version => version(cli.config.as_deref()).await,
        Commands::Key(args) => {
            let ctx = Context {
                config: Config::resolve(cli.config.as_deref())?,
                owner: OwnerId(cli.owner),
            };
            commands::key::run(args, &ctx).await
        }
        Commands::Item(args) => {
            let ctx = Context {
                config: Config::resolve(cli.config.as_deref())?,
                owner: OwnerId(cli.owner),
            };
            commands::item::run(args, &ctx).await
        }
    }
}
