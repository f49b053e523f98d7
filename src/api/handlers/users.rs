//! User management endpoints.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use tracing::instrument;

use crate::api::error::ApiError;
use crate::api::routes::ApiState;
use crate::auth::models::AuthContext;
use crate::auth::user::UserResponse;
use crate::auth::user_service::{PageParams, UpdateUserRequest, UserPage};
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error};

fn require_ownership(context: &AuthContext, target: &UserId) -> Result<(), ApiError> {
    if context.can_access_user(target) {
        Ok(())
    } else {
        Err(ApiError::from(Error::auth(
            "Insufficient permissions",
            AuthErrorType::InsufficientPermissions,
        )))
    }
}

#[utoipa::path(
    get,
    path = "/users",
    params(
        ("page" = Option<i64>, Query, description = "1-based page number"),
        ("perPage" = Option<i64>, Query, description = "Page size, capped at 100")
    ),
    responses(
        (status = 200, description = "One page of users", body = UserPage),
        (status = 403, description = "Admin privileges required")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, context), fields(user_id = %context.user_id))]
pub async fn list_users(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Query(params): Query<PageParams>,
) -> Result<Json<UserPage>, ApiError> {
    let page = state.user_service.list_users(params).await?;
    Ok(Json(page))
}

#[utoipa::path(
    get,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User found", body = UserResponse),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, context), fields(target_user_id = %id, user_id = %context.user_id))]
pub async fn get_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = UserId::from_string(id);
    require_ownership(&context, &id)?;

    let user = state.user_service.get_user(&id).await?;
    Ok(Json(user))
}

#[utoipa::path(
    patch,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 403, description = "Not the owner and not an admin"),
        (status = 404, description = "User not found"),
        (status = 409, description = "Email already taken")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, context, payload), fields(target_user_id = %id, user_id = %context.user_id))]
pub async fn update_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateUserRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let id = UserId::from_string(id);
    require_ownership(&context, &id)?;

    let user = state.user_service.update_user(&id, payload).await?;
    Ok(Json(user))
}

#[utoipa::path(
    delete,
    path = "/users/{id}",
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Admin privileges required"),
        (status = 404, description = "User not found")
    ),
    security(("bearer_auth" = [])),
    tag = "users"
)]
#[instrument(skip(state, context), fields(target_user_id = %id, user_id = %context.user_id))]
pub async fn delete_user(
    State(state): State<ApiState>,
    Extension(context): Extension<AuthContext>,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let id = UserId::from_string(id);
    state.user_service.delete_user(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
