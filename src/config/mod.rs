//! # Configuration Management
//!
//! Environment-driven configuration for the userhub service. Settings are
//! collected into an [`AppConfig`] tree at startup, validated once, and then
//! passed by handle into the components that need them.

mod settings;

pub use settings::{
    AppConfig, AuthConfig, CacheConfig, DatabaseConfig, Environment, ObservabilityConfig,
    RateLimitConfig, ServerConfig,
};
