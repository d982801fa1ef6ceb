pub mod config;
pub mod error;

pub use config::{Config, LlmConfig, LoggingConfig, ValidationResult, WeatherConfig};
pub use error::ConfigError;

use anyhow::Result;

/// Initialize tracing/logging.
///
/// `RUST_LOG` takes precedence over `default_filter`. Logs go to stderr so
/// stdout stays reserved for the response envelope.
pub fn init(default_filter: &str) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    tracing::debug!("wxbot core initialized");
    Ok(())
}
