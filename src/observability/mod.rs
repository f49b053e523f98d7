//! # Observability Infrastructure
//!
//! Structured logging and health checking for the service.

pub mod health;
pub mod logging;

pub use health::{
    CacheHealthProvider, DatabaseHealthProvider, HealthCheck, HealthChecker, HealthProvider,
    HealthStatus,
};
pub use logging::{init_logging, log_config_info};
