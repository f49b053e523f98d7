//! # Structured Logging
//!
//! Logging setup on the tracing ecosystem: `EnvFilter` driven by
//! configuration, JSON output in production, human-readable output in
//! development.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AppConfig, Environment, ObservabilityConfig};
use crate::errors::{Error, Result};

/// Install the global tracing subscriber.
///
/// The filter honors `RUST_LOG` when set, falling back to the configured
/// level. Calling this twice is an error.
pub fn init_logging(config: &ObservabilityConfig, environment: Environment) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| Error::config(format!("Invalid log filter '{}': {}", config.log_level, e)))?;

    let registry = tracing_subscriber::registry().with(filter);

    let init_result = if environment.is_production() {
        registry.with(fmt::layer().json().with_current_span(true)).try_init()
    } else {
        registry.with(fmt::layer().pretty()).try_init()
    };

    init_result.map_err(|e| Error::config(format!("Failed to install tracing subscriber: {}", e)))
}

/// Log effective configuration at startup.
pub fn log_config_info(config: &AppConfig) {
    tracing::info!(
        service_name = %config.observability.service_name,
        server_address = %config.server.bind_address(),
        environment = ?config.environment,
        cache_backend = if config.cache.url.is_some() { "redis" } else { "memory" },
        access_ttl_seconds = config.auth.access_ttl_seconds,
        refresh_ttl_seconds = config.auth.refresh_ttl_seconds,
        rate_limit_max_requests = config.rate_limit.max_requests,
        "Service configuration"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_config_info() {
        let config = AppConfig::default();
        log_config_info(&config);
    }
}
