//! Logging setup
//!
//! Installs a `tracing-subscriber` registry with an env filter and a JSON or
//! human-readable formatter.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::LoggingConfig;

/// Telemetry error types
#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    /// The level string is not a valid filter directive
    #[error("Invalid log filter '{0}': {1}")]
    InvalidFilter(String, String),

    /// A global subscriber was already installed
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

/// Build the env filter
///
/// `RUST_LOG` wins over the configured level when it is set.
pub fn build_filter(level: &str) -> Result<EnvFilter, TelemetryError> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(level)
            .map_err(|e| TelemetryError::InvalidFilter(level.to_string(), e.to_string())),
    }
}

/// Initialize tracing subscriber
pub fn init_tracing(config: &LoggingConfig) -> Result<(), TelemetryError> {
    let filter = build_filter(&config.level)?;

    if config.format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
            .map_err(|e| TelemetryError::Init(e.to_string()))?;
    }

    Ok(())
}
