//! Application assembly: construct every component once and wire them
//! together explicitly.

use std::sync::Arc;

use axum::Router;
use tracing::info;

use crate::api::rate_limit::RateLimitState;
use crate::api::routes::{build_router, ApiState};
use crate::api::server;
use crate::auth::jwt::TokenIssuer;
use crate::auth::middleware::AuthState;
use crate::auth::service::AuthService;
use crate::auth::session::SessionStore;
use crate::auth::user_service::UserService;
use crate::cache::{create_session_cache, SessionCache};
use crate::config::AppConfig;
use crate::errors::Result;
use crate::observability::{
    CacheHealthProvider, DatabaseHealthProvider, HealthChecker,
};
use crate::storage::{create_pool, DbPool, SqlxUserRepository};

/// Fully wired application, ready to serve.
pub struct Application {
    pub router: Router,
    pub pool: DbPool,
    pub cache: Arc<dyn SessionCache>,
}

/// Build the application from configuration: connect the database and cache,
/// construct services, and assemble the router.
pub async fn build_application(config: &AppConfig) -> Result<Application> {
    let pool = create_pool(&config.database).await?;
    let cache = create_session_cache(&config.cache).await?;

    let issuer = Arc::new(TokenIssuer::new(&config.auth));
    let sessions = SessionStore::new(
        cache.clone(),
        config.auth.access_ttl_seconds,
        config.auth.refresh_ttl_seconds,
    );

    let user_repository = Arc::new(SqlxUserRepository::new(pool.clone()));
    let auth_service = AuthService::new(user_repository.clone(), sessions.clone(), issuer.clone());
    let user_service = UserService::new(user_repository, sessions.clone());

    let health = HealthChecker::new();
    health.register_provider("database", Box::new(DatabaseHealthProvider::new(pool.clone()))).await;
    health.register_provider("cache", Box::new(CacheHealthProvider::new(cache.clone()))).await;

    let api_state = ApiState { auth_service, user_service, health };
    let auth_state = AuthState { issuer, sessions };
    let rate_limit_state = RateLimitState::new(cache.clone(), &config.rate_limit);

    let router = build_router(api_state, auth_state, rate_limit_state);

    Ok(Application { router, pool, cache })
}

/// Build and run the application until shutdown.
pub async fn run(config: AppConfig) -> Result<()> {
    let application = build_application(&config).await?;
    info!("Application components wired");
    server::start_server(&config.server, application.router).await
}
