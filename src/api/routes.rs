//! Router assembly.

use axum::{
    middleware,
    routing::{delete, get, post},
    Json, Router,
};
use utoipa::OpenApi;

use crate::auth::middleware::{authenticate, require_role, AuthState};
use crate::auth::service::AuthService;
use crate::auth::user::Role;
use crate::auth::user_service::UserService;
use crate::observability::HealthChecker;

use super::docs::ApiDoc;
use super::handlers::{auth, health, users};
use super::rate_limit::{rate_limit, RateLimitState};

/// Shared handler state.
#[derive(Clone)]
pub struct ApiState {
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub health: HealthChecker,
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the application router.
///
/// Layer order per route group: authentication first (so rate limiting can
/// key on the user id), then rate limiting. Health and docs endpoints are
/// left unauthenticated and unthrottled.
pub fn build_router(
    api_state: ApiState,
    auth_state: AuthState,
    rate_limit_state: RateLimitState,
) -> Router {
    let admin_routes = Router::new()
        .route("/users", get(users::list_users))
        .route("/users/{id}", delete(users::delete_user))
        .route_layer(middleware::from_fn_with_state(Role::Admin, require_role));

    let owner_routes =
        Router::new().route("/users/{id}", get(users::get_user).patch(users::update_user));

    let session_routes = Router::new()
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me));

    let protected = Router::new()
        .merge(admin_routes)
        .merge(owner_routes)
        .merge(session_routes)
        .layer(middleware::from_fn_with_state(rate_limit_state.clone(), rate_limit))
        .layer(middleware::from_fn_with_state(auth_state, authenticate));

    let public = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh))
        .layer(middleware::from_fn_with_state(rate_limit_state, rate_limit));

    let probes = Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/api-docs/openapi.json", get(openapi_json));

    Router::new().merge(protected).merge(public).merge(probes).with_state(api_state)
}
