//! # Configuration Settings
//!
//! Defines the configuration structure for the userhub service.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::Validate;

/// Runtime environment, controls log format and error detail exposure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
pub struct AppConfig {
    /// Runtime environment
    pub environment: Environment,

    /// HTTP server configuration
    #[validate(nested)]
    pub server: ServerConfig,

    /// Database configuration
    #[validate(nested)]
    pub database: DatabaseConfig,

    /// Session cache configuration
    #[validate(nested)]
    pub cache: CacheConfig,

    /// Authentication configuration
    #[validate(nested)]
    pub auth: AuthConfig,

    /// Rate limiting configuration
    #[validate(nested)]
    pub rate_limit: RateLimitConfig,

    /// Observability configuration
    #[validate(nested)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)?;
        self.validate_custom()
    }

    /// Custom validation logic that goes beyond what the validator crate can do
    fn validate_custom(&self) -> Result<()> {
        if !self.database.url.starts_with("sqlite:") {
            return Err(Error::validation("Database URL must start with 'sqlite:'"));
        }

        if self.auth.access_secret.len() < 32 {
            return Err(Error::validation(
                "Access token secret must be at least 32 characters long",
            ));
        }

        if self.auth.refresh_secret.len() < 32 {
            return Err(Error::validation(
                "Refresh token secret must be at least 32 characters long",
            ));
        }

        if self.auth.access_secret == self.auth.refresh_secret {
            return Err(Error::validation(
                "Access and refresh token secrets must be distinct",
            ));
        }

        if self.auth.refresh_ttl_seconds <= self.auth.access_ttl_seconds {
            return Err(Error::validation(
                "Refresh token lifetime must exceed access token lifetime",
            ));
        }

        Ok(())
    }

    /// Create configuration from environment variables (prefix `USERHUB_`)
    pub fn from_env() -> Result<Self> {
        let config = Self {
            environment: match env_or("USERHUB_ENV", "development").as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            server: ServerConfig {
                host: env_or("USERHUB_HOST", "127.0.0.1"),
                port: parse_env("USERHUB_PORT", 8080)?,
                enable_cors: parse_env("USERHUB_ENABLE_CORS", true)?,
            },
            database: DatabaseConfig {
                url: env_or("USERHUB_DATABASE_URL", "sqlite://./data/userhub.db"),
                max_connections: parse_env("USERHUB_DB_MAX_CONNECTIONS", 10)?,
                min_connections: parse_env("USERHUB_DB_MIN_CONNECTIONS", 0)?,
                connect_timeout_seconds: parse_env("USERHUB_DB_CONNECT_TIMEOUT_SECONDS", 10)?,
                idle_timeout_seconds: parse_env("USERHUB_DB_IDLE_TIMEOUT_SECONDS", 600)?,
                auto_migrate: parse_env("USERHUB_DB_AUTO_MIGRATE", true)?,
            },
            cache: CacheConfig {
                url: std::env::var("USERHUB_REDIS_URL").ok(),
                key_prefix: env_or("USERHUB_CACHE_PREFIX", "userhub"),
            },
            auth: AuthConfig {
                access_secret: env_or("USERHUB_ACCESS_TOKEN_SECRET", ""),
                refresh_secret: env_or("USERHUB_REFRESH_TOKEN_SECRET", ""),
                access_ttl_seconds: parse_env("USERHUB_ACCESS_TOKEN_TTL_SECONDS", 900)?,
                refresh_ttl_seconds: parse_env("USERHUB_REFRESH_TOKEN_TTL_SECONDS", 604_800)?,
            },
            rate_limit: RateLimitConfig {
                max_requests: parse_env("USERHUB_RATE_LIMIT_MAX_REQUESTS", 100)?,
                window_seconds: parse_env("USERHUB_RATE_LIMIT_WINDOW_SECONDS", 60)?,
            },
            observability: ObservabilityConfig {
                log_level: env_or("USERHUB_LOG_LEVEL", "info"),
                service_name: env_or("USERHUB_SERVICE_NAME", "userhub"),
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| Error::config(format!("Invalid value for {}: {}", key, e))),
        Err(_) => Ok(default),
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ServerConfig {
    /// Server bind address
    #[validate(length(min = 1, message = "Host cannot be empty"))]
    pub host: String,

    /// Server port
    #[validate(range(min = 1, message = "Port must be between 1 and 65535"))]
    pub port: u16,

    /// Enable CORS
    pub enable_cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".to_string(), port: 8080, enable_cors: true }
    }
}

impl ServerConfig {
    /// Get the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct DatabaseConfig {
    /// Database connection URL
    #[validate(length(min = 1, message = "Database URL cannot be empty"))]
    pub url: String,

    /// Maximum number of connections in the pool
    #[validate(range(min = 1, max = 100, message = "Max connections must be between 1 and 100"))]
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,

    /// Connection timeout in seconds
    #[validate(range(min = 1, max = 60, message = "Connect timeout must be between 1 and 60 seconds"))]
    pub connect_timeout_seconds: u64,

    /// Idle timeout in seconds (0 = no timeout)
    pub idle_timeout_seconds: u64,

    /// Enable automatic migrations on startup
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./data/userhub.db".to_string(),
            max_connections: 10,
            min_connections: 0,
            connect_timeout_seconds: 10,
            idle_timeout_seconds: 600,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// Get connection timeout as Duration
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_seconds)
    }

    /// Get idle timeout as Duration (None if 0)
    pub fn idle_timeout(&self) -> Option<Duration> {
        if self.idle_timeout_seconds == 0 {
            None
        } else {
            Some(Duration::from_secs(self.idle_timeout_seconds))
        }
    }
}

/// Session cache configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CacheConfig {
    /// Redis connection URL. When absent the in-memory backend is used,
    /// which only makes sense for a single-process deployment.
    pub url: Option<String>,

    /// Prefix applied to every cache key
    #[validate(length(min = 1, message = "Cache key prefix cannot be empty"))]
    pub key_prefix: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { url: None, key_prefix: "userhub".to_string() }
    }
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct AuthConfig {
    /// HMAC secret for access tokens
    pub access_secret: String,

    /// HMAC secret for refresh tokens (distinct from the access secret)
    pub refresh_secret: String,

    /// Access token lifetime in seconds
    #[validate(range(min = 1, message = "Access token TTL must be positive"))]
    pub access_ttl_seconds: u64,

    /// Refresh token lifetime in seconds
    #[validate(range(min = 1, message = "Refresh token TTL must be positive"))]
    pub refresh_ttl_seconds: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            access_secret: String::new(),
            refresh_secret: String::new(),
            access_ttl_seconds: 900,
            refresh_ttl_seconds: 604_800,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RateLimitConfig {
    /// Maximum requests allowed per window per identifier
    #[validate(range(min = 1, message = "Max requests must be positive"))]
    pub max_requests: u64,

    /// Window length in seconds
    #[validate(range(min = 1, message = "Window must be positive"))]
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self { max_requests: 100, window_seconds: 60 }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ObservabilityConfig {
    /// Log level filter (e.g. "info", "userhub=debug,info")
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub log_level: String,

    /// Service name reported in logs
    #[validate(length(min = 1, message = "Service name cannot be empty"))]
    pub service_name: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string(), service_name: "userhub".to_string() }
    }
}
