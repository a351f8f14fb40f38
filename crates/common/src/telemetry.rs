//! Telemetry bootstrap.
//!
//! Initializes the global `tracing` subscriber from [`LoggingConfig`].
//! Binaries and integration harnesses call [`init`] once at startup; library
//! code only ever emits through the `tracing` macros.

use crate::config::LoggingConfig;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize the global tracing subscriber.
///
/// The filter falls back to the configured directive when `RUST_LOG` is not
/// set. Calling this twice returns an error from the subscriber registry, so
/// it is a startup-only affair.
pub fn init(config: &LoggingConfig) -> Result<(), crate::AppError> {
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter.clone()));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        registry.with(tracing_subscriber::fmt::layer()).try_init()
    };

    result.map_err(|e| crate::AppError::Config(format!("tracing init failed: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_not_reentrant() {
        let config = LoggingConfig::default();
        let first = init(&config);
        let second = init(&config);
        // Whichever call won the race to install the global subscriber, the
        // other must report failure instead of silently replacing it.
        assert!(first.is_ok() || second.is_err());
    }
}
