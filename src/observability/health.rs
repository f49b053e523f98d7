//! # Health Checking
//!
//! Readiness probes with pluggable per-component providers.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::cache::SessionCache;
use crate::errors::Result;

/// Health status for a component
#[derive(Debug, Clone, PartialEq)]
pub enum HealthStatus {
    /// Component is healthy and operational
    Healthy,
    /// Component is unhealthy and not functional
    Unhealthy { message: String },
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        matches!(self, HealthStatus::Healthy)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            HealthStatus::Healthy => None,
            HealthStatus::Unhealthy { message } => Some(message),
        }
    }
}

/// Health check result for a component
#[derive(Debug, Clone)]
pub struct HealthCheck {
    pub component: String,
    pub status: HealthStatus,
    pub last_check: chrono::DateTime<chrono::Utc>,
}

impl HealthCheck {
    pub fn healthy<S: Into<String>>(component: S) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Healthy,
            last_check: chrono::Utc::now(),
        }
    }

    pub fn unhealthy<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self {
            component: component.into(),
            status: HealthStatus::Unhealthy { message: message.into() },
            last_check: chrono::Utc::now(),
        }
    }
}

/// Component that provides health checking functionality
#[async_trait]
pub trait HealthProvider: Send + Sync {
    async fn health_check(&self) -> Result<HealthCheck>;
}

/// Central health checker aggregating all registered providers
#[derive(Clone, Default)]
pub struct HealthChecker {
    providers: Arc<RwLock<HashMap<String, Box<dyn HealthProvider>>>>,
}

impl HealthChecker {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register_provider<S: Into<String>>(
        &self,
        name: S,
        provider: Box<dyn HealthProvider>,
    ) {
        self.providers.write().await.insert(name.into(), provider);
    }

    /// Run every registered probe.
    pub async fn check_all(&self) -> HashMap<String, HealthCheck> {
        let providers = self.providers.read().await;
        let mut results = HashMap::new();

        for (name, provider) in providers.iter() {
            let check = match provider.health_check().await {
                Ok(check) => check,
                Err(e) => {
                    HealthCheck::unhealthy(name.clone(), format!("Health check failed: {}", e))
                }
            };
            results.insert(name.clone(), check);
        }

        results
    }

    /// Ready to serve traffic only when every component is healthy.
    pub async fn is_ready(&self) -> bool {
        let checks = self.check_all().await;
        !checks.is_empty() && checks.values().all(|check| check.status.is_healthy())
    }
}

/// Database health provider
pub struct DatabaseHealthProvider {
    db_pool: crate::storage::DbPool,
}

impl DatabaseHealthProvider {
    pub fn new(db_pool: crate::storage::DbPool) -> Self {
        Self { db_pool }
    }
}

#[async_trait]
impl HealthProvider for DatabaseHealthProvider {
    async fn health_check(&self) -> Result<HealthCheck> {
        match sqlx::query("SELECT 1").fetch_one(&self.db_pool).await {
            Ok(_) => Ok(HealthCheck::healthy("database")),
            Err(e) => {
                Ok(HealthCheck::unhealthy("database", format!("Database ping failed: {}", e)))
            }
        }
    }
}

/// Session cache health provider
pub struct CacheHealthProvider {
    cache: Arc<dyn SessionCache>,
}

impl CacheHealthProvider {
    pub fn new(cache: Arc<dyn SessionCache>) -> Self {
        Self { cache }
    }
}

#[async_trait]
impl HealthProvider for CacheHealthProvider {
    async fn health_check(&self) -> Result<HealthCheck> {
        // A read of any key exercises the connection.
        match self.cache.get("health:probe").await {
            Ok(_) => Ok(HealthCheck::healthy("cache")),
            Err(e) => Ok(HealthCheck::unhealthy("cache", format!("Cache ping failed: {}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemorySessionCache;

    struct MockHealthProvider {
        status: HealthStatus,
    }

    #[async_trait]
    impl HealthProvider for MockHealthProvider {
        async fn health_check(&self) -> Result<HealthCheck> {
            Ok(HealthCheck { component: "mock".to_string(), status: self.status.clone(), last_check: chrono::Utc::now() })
        }
    }

    #[test]
    fn health_status_accessors() {
        assert!(HealthStatus::Healthy.is_healthy());
        assert!(HealthStatus::Healthy.message().is_none());

        let unhealthy = HealthStatus::Unhealthy { message: "down".to_string() };
        assert!(!unhealthy.is_healthy());
        assert_eq!(unhealthy.message(), Some("down"));
    }

    #[tokio::test]
    async fn empty_checker_is_not_ready() {
        let checker = HealthChecker::new();
        assert!(!checker.is_ready().await);
    }

    #[tokio::test]
    async fn readiness_requires_all_healthy() {
        let checker = HealthChecker::new();
        checker
            .register_provider("a", Box::new(MockHealthProvider { status: HealthStatus::Healthy }))
            .await;
        assert!(checker.is_ready().await);

        checker
            .register_provider(
                "b",
                Box::new(MockHealthProvider {
                    status: HealthStatus::Unhealthy { message: "down".to_string() },
                }),
            )
            .await;
        assert!(!checker.is_ready().await);

        let checks = checker.check_all().await;
        assert_eq!(checks.len(), 2);
    }

    #[tokio::test]
    async fn cache_provider_reports_healthy_for_memory_backend() {
        let provider = CacheHealthProvider::new(Arc::new(MemorySessionCache::new()));
        let check = provider.health_check().await.unwrap();
        assert!(check.status.is_healthy());
    }
}
