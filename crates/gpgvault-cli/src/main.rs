//! gpgvault CLI entry point.

use clap::Parser;
use gpgvault_cli::{logging, run, Cli};
use gpgvault_core::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // A broken config file is reported by the command itself
    let logging_config = Config::resolve(cli.config.as_deref())
        .map(|c| c.logging)
        .unwrap_or_default();
    logging::init(cli.verbose, &logging_config);

    run(cli).await
}
