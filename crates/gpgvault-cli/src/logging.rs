//! Tracing subscriber setup.

use gpgvault_core::config::{LogLevel, LoggingConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a verbosity count and configured level.
///
/// `-v` raises to debug and `-vv` to trace regardless of the config.
pub fn default_directive(verbose: u8, level: LogLevel) -> String {
    let level = match verbose {
        0 => level.as_str(),
        1 => "debug",
        _ => "trace",
    };
    format!("gpgvault={level}")
}

/// Install the global subscriber. `RUST_LOG` wins over everything else.
///
/// Logs go to stderr so command output on stdout stays pipeable.
pub fn init(verbose: u8, config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_directive(verbose, config.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }
}
