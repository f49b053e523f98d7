//! Authentication endpoints.

use axum::{extract::State, http::StatusCode, Extension, Json};
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::{
    AuthContext, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
};
use crate::auth::user::UserResponse;

#[utoipa::path(
    post,
    path = "/auth/register",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Validation error"),
        (status = 409, description = "Email already registered")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn register(
    State(state): State<ApiState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let response = state.auth_service.register(&payload).await?;
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Authenticated", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload), fields(email = %payload.email))]
pub async fn login(
    State(state): State<ApiState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    let response = state.auth_service.login(&payload).await?;
    Ok(Json(response))
}

#[utoipa::path(
    post,
    path = "/auth/refresh",
    request_body = RefreshRequest,
    responses(
        (status = 200, description = "Token pair rotated", body = TokenPairResponse),
        (status = 401, description = "Invalid, expired, or superseded refresh token")
    ),
    tag = "auth"
)]
#[instrument(skip(state, payload))]
pub async fn refresh(
    State(state): State<ApiState>,
    Json(payload): Json<RefreshRequest>,
) -> Result<Json<TokenPairResponse>, ApiError> {
    let tokens = state.auth_service.refresh(&payload).await?;
    Ok(Json(tokens))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Session invalidated"),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
#[instrument(skip(state, context), fields(user_id = %context.user_id))]
pub async fn logout(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<StatusCode, ApiError> {
    state.auth_service.logout(&context).await?;
    Ok(StatusCode::OK)
}

#[utoipa::path(
    get,
    path = "/auth/me",
    responses(
        (status = 200, description = "Authenticated user", body = UserResponse),
        (status = 401, description = "Not authenticated")
    ),
    security(("bearer_auth" = [])),
    tag = "auth"
)]
#[instrument(skip(state, context), fields(user_id = %context.user_id))]
pub async fn me(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state.user_service.get_user(&context.user_id).await?;
    Ok(Json(user))
}
