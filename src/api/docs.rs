//! OpenAPI document generation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::api::handlers::health::health,
        crate::api::handlers::health::ready,
        crate::api::handlers::auth::register,
        crate::api::handlers::auth::login,
        crate::api::handlers::auth::refresh,
        crate::api::handlers::auth::logout,
        crate::api::handlers::auth::me,
        crate::api::handlers::users::list_users,
        crate::api::handlers::users::get_user,
        crate::api::handlers::users::update_user,
        crate::api::handlers::users::delete_user,
    ),
    components(schemas(
        crate::api::handlers::health::HealthResponse,
        crate::api::handlers::health::ReadyResponse,
        crate::api::handlers::health::ComponentStatus,
        crate::auth::models::LoginRequest,
        crate::auth::models::RegisterRequest,
        crate::auth::models::RefreshRequest,
        crate::auth::models::TokenPairResponse,
        crate::auth::models::AuthResponse,
        crate::auth::user::UserResponse,
        crate::auth::user::Role,
        crate::auth::user_service::UpdateUserRequest,
        crate::auth::user_service::UserPage,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = "auth", description = "Authentication and session management"),
        (name = "users", description = "User account management"),
        (name = "health", description = "Liveness and readiness probes")
    ),
    info(
        title = "userhub",
        description = "User account REST API with JWT authentication and cache-backed session revocation"
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn openapi_document_includes_all_routes() {
        let doc = ApiDoc::openapi();
        let paths: Vec<&String> = doc.paths.paths.keys().collect();

        for expected in [
            "/health",
            "/ready",
            "/auth/register",
            "/auth/login",
            "/auth/refresh",
            "/auth/logout",
            "/auth/me",
            "/users",
            "/users/{id}",
        ] {
            assert!(paths.iter().any(|p| *p == expected), "missing path {}", expected);
        }
    }
}
