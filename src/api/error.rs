use axum::{http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::errors::{AuthErrorType, Error};

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    Conflict(String),
    NotFound(String),
    Unauthorized(String),
    Forbidden(String),
    TooManyRequests { retry_after: u64 },
    ServiceUnavailable(String),
    Internal(String),
}

impl ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn unauthorized<S: Into<String>>(msg: S) -> Self {
        ApiError::Unauthorized(msg.into())
    }

    pub fn forbidden<S: Into<String>>(msg: S) -> Self {
        ApiError::Forbidden(msg.into())
    }

    pub fn service_unavailable<S: Into<String>>(msg: S) -> Self {
        ApiError::ServiceUnavailable(msg.into())
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = self.status_code();
        let error_kind = match self {
            ApiError::BadRequest(_) => "bad_request",
            ApiError::Conflict(_) => "conflict",
            ApiError::NotFound(_) => "not_found",
            ApiError::Unauthorized(_) => "unauthorized",
            ApiError::Forbidden(_) => "forbidden",
            ApiError::TooManyRequests { .. } => "too_many_requests",
            ApiError::ServiceUnavailable(_) => "service_unavailable",
            ApiError::Internal(_) => "internal_error",
        };

        match self {
            ApiError::TooManyRequests { retry_after } => (
                status,
                [("Retry-After", retry_after.to_string())],
                Json(ErrorBody { error: error_kind, message: "Rate limit exceeded".to_string() }),
            )
                .into_response(),
            ApiError::Internal(detail) => {
                // Detail goes to the log; the response body stays generic so
                // internals never leak to clients.
                tracing::error!(detail = %detail, "internal server error");
                (
                    status,
                    Json(ErrorBody {
                        error: error_kind,
                        message: "Internal server error".to_string(),
                    }),
                )
                    .into_response()
            }
            ApiError::BadRequest(message)
            | ApiError::Conflict(message)
            | ApiError::NotFound(message)
            | ApiError::Unauthorized(message)
            | ApiError::Forbidden(message)
            | ApiError::ServiceUnavailable(message) => {
                (status, Json(ErrorBody { error: error_kind, message })).into_response()
            }
        }
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        match err {
            Error::Validation(msg) => ApiError::BadRequest(msg),
            Error::NotFound { resource, id } => {
                ApiError::NotFound(format!("{} '{}' not found", resource, id))
            }
            Error::Conflict(msg) => ApiError::Conflict(msg),
            Error::Auth { message, error_type } => match error_type {
                AuthErrorType::InsufficientPermissions => ApiError::Forbidden(message),
                _ => ApiError::Unauthorized(message),
            },
            Error::RateLimit { retry_after } => ApiError::TooManyRequests { retry_after },
            Error::Database { context, .. } => ApiError::Internal(context),
            Error::Cache { context, .. } => ApiError::Internal(context),
            Error::Config(msg) | Error::Internal(msg) => ApiError::Internal(msg),
        }
    }
}
