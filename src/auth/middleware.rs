//! Axum middleware for authentication and authorization.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::{Extension, State},
    http::{header::AUTHORIZATION, Method, Request},
    middleware::Next,
    response::Response,
};
use tracing::{field, info_span, warn};

use crate::api::error::ApiError;
use crate::auth::jwt::TokenIssuer;
use crate::auth::models::AuthContext;
use crate::auth::session::SessionStore;
use crate::auth::user::Role;
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};

/// Shared state for the authentication middleware.
#[derive(Clone)]
pub struct AuthState {
    pub issuer: Arc<TokenIssuer>,
    pub sessions: SessionStore,
}

impl AuthState {
    /// Verify a bearer header and resolve it to an [`AuthContext`].
    async fn authenticate(&self, header: &str) -> Result<AuthContext> {
        let token = extract_bearer_token(header)?;
        let claims = self.issuer.verify_access_token(token)?;

        // Signature checks out; the cache decides whether the session is
        // still live.
        match self.sessions.access_user(&claims.jti).await? {
            Some(user_id) if user_id == claims.sub => {}
            _ => {
                return Err(Error::auth(
                    "Token invalidated or expired",
                    AuthErrorType::RevokedToken,
                ));
            }
        }

        let role = claims
            .role
            .parse::<Role>()
            .map_err(|_| Error::auth("Invalid token", AuthErrorType::InvalidToken))?;

        Ok(AuthContext {
            user_id: UserId::from_string(claims.sub),
            email: claims.email,
            role,
            jti: claims.jti,
        })
    }
}

fn extract_bearer_token(header: &str) -> Result<&str> {
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| Error::auth("Missing bearer token", AuthErrorType::MissingToken))?;
    Ok(token)
}

/// Middleware entry point that authenticates requests.
pub async fn authenticate(
    State(state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    if request.method() == Method::OPTIONS {
        return Ok(next.run(request).await);
    }

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let span = info_span!(
        "auth_middleware.authenticate",
        http.method = %method,
        http.path = %path,
        auth.user_id = field::Empty,
    );
    let _guard = span.enter();

    let header =
        request.headers().get(AUTHORIZATION).and_then(|value| value.to_str().ok()).unwrap_or("");

    match state.authenticate(header).await {
        Ok(context) => {
            tracing::Span::current().record("auth.user_id", field::display(&context.user_id));
            request.extensions_mut().insert(context);
            Ok(next.run(request).await)
        }
        Err(err) => {
            warn!(error = %err, "authentication failed");
            Err(ApiError::from(err))
        }
    }
}

/// Middleware entry point that requires the caller to hold a minimum role.
/// Admin passes every check.
pub async fn require_role(
    State(required): State<Role>,
    Extension(context): Extension<AuthContext>,
    request: Request<Body>,
    next: Next,
) -> std::result::Result<Response, ApiError> {
    if context.role.is_admin() || context.role == required {
        return Ok(next.run(request).await);
    }

    warn!(
        user_id = %context.user_id,
        role = %context.role,
        required = %required,
        "role check failed"
    );
    Err(ApiError::from(Error::auth(
        "Insufficient permissions",
        AuthErrorType::InsufficientPermissions,
    )))
}
