//! Tracing subscriber bootstrap

use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber
///
/// `RUST_LOG` takes precedence over the configured level. Calling this more
/// than once is harmless: later calls leave the first subscriber in place
/// and return `false`.
pub fn init(config: &LoggingConfig) -> bool {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true);

    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };

    result.is_ok()
}
