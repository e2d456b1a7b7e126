//! Tracing subscriber setup.

use orderfeed_core::{LogFormat, LoggingConfig};
use tracing_subscriber::EnvFilter;

use crate::error::AppError;

/// Level used when neither `RUST_LOG` nor the config gives a valid one.
const FALLBACK_LEVEL: &str = "info";

/// Build the event filter. `RUST_LOG` wins when set and valid, then the
/// configured level, then `info`.
pub fn build_filter(configured_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured_level))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_LEVEL))
}

/// Install the global subscriber.
pub fn init(config: &LoggingConfig) -> Result<(), AppError> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(build_filter(&config.level))
        .with_target(true);

    let result = match config.format {
        LogFormat::Pretty => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    result.map_err(|e| AppError::Logging {
        message: e.to_string(),
    })
}
