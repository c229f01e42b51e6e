//! Tracing subscriber setup

use anyhow::{Result, anyhow};
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Install the global subscriber. `RUST_LOG` wins over the configured level;
/// `level_override` (from the command line) wins over both.
pub fn init(config: &LoggingConfig, level_override: Option<&str>) -> Result<()> {
    let env_filter = match level_override {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(&config.level))?,
    };

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    let installed = match config.format.as_str() {
        "json" => builder.json().with_target(true).try_init(),
        "compact" => builder.compact().try_init(),
        _ => builder.pretty().try_init(),
    };
    installed.map_err(|e| anyhow!("Failed to install tracing subscriber: {e}"))?;

    tracing::debug!(
        level = %config.level,
        format = %config.format,
        "Logging initialized"
    );
    Ok(())
}
