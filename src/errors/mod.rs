//! # Error Handling
//!
//! Crate-wide error types for the userhub service using `thiserror`.
//! The HTTP layer maps these onto status codes in `api::error`; services and
//! repositories construct them with the helper constructors below and
//! propagate with `?`.

use std::fmt;

/// Custom result type for userhub operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the userhub service
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database and storage errors
    #[error("Database error: {context}")]
    Database {
        #[source]
        source: sqlx::Error,
        context: String,
    },

    /// Session cache errors
    #[error("Cache error: {context}")]
    Cache {
        #[source]
        source: redis::RedisError,
        context: String,
    },

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Authentication and authorization errors
    #[error("Authentication error: {message}")]
    Auth {
        message: String,
        error_type: AuthErrorType,
    },

    /// Resource not found errors
    #[error("Resource not found: {resource} with ID '{id}'")]
    NotFound { resource: String, id: String },

    /// Resource conflict errors (duplicate unique field)
    #[error("Resource conflict: {0}")]
    Conflict(String),

    /// Rate limiting errors
    #[error("Rate limit exceeded")]
    RateLimit { retry_after: u64 },

    /// Internal server errors
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Authentication error subtypes.
///
/// Expiry is distinguished from structural invalidity so the HTTP layer can
/// surface distinct messages, but both map to 401.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthErrorType {
    InvalidCredentials,
    InvalidToken,
    ExpiredToken,
    MissingToken,
    RevokedToken,
    InsufficientPermissions,
}

impl fmt::Display for AuthErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AuthErrorType::InvalidCredentials => "invalid_credentials",
            AuthErrorType::InvalidToken => "invalid_token",
            AuthErrorType::ExpiredToken => "expired_token",
            AuthErrorType::MissingToken => "missing_token",
            AuthErrorType::RevokedToken => "revoked_token",
            AuthErrorType::InsufficientPermissions => "insufficient_permissions",
        };
        write!(f, "{}", s)
    }
}

impl Error {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    /// Create an authentication error
    pub fn auth<S: Into<String>>(message: S, error_type: AuthErrorType) -> Self {
        Self::Auth { message: message.into(), error_type }
    }

    /// Create a not found error
    pub fn not_found<R: Into<String>, I: Into<String>>(resource: R, id: I) -> Self {
        Self::NotFound { resource: resource.into(), id: id.into() }
    }

    /// Create a conflict error
    pub fn conflict<S: Into<String>>(message: S) -> Self {
        Self::Conflict(message.into())
    }

    /// Create an internal server error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Get the HTTP status code that should be returned for this error
    pub fn status_code(&self) -> u16 {
        match self {
            Error::Config(_) => 500,
            Error::Database { .. } => 500,
            Error::Cache { .. } => 500,
            Error::Validation(_) => 400,
            Error::Auth { error_type, .. } => match error_type {
                AuthErrorType::InsufficientPermissions => 403,
                _ => 401,
            },
            Error::NotFound { .. } => 404,
            Error::Conflict(_) => 409,
            Error::RateLimit { .. } => 429,
            Error::Internal(_) => 500,
        }
    }
}

// Error conversions for common external error types

impl From<sqlx::Error> for Error {
    fn from(error: sqlx::Error) -> Self {
        Self::Database { source: error, context: "Database operation failed".to_string() }
    }
}

impl From<redis::RedisError> for Error {
    fn from(error: redis::RedisError) -> Self {
        Self::Cache { source: error, context: "Cache operation failed".to_string() }
    }
}

impl From<validator::ValidationErrors> for Error {
    fn from(errors: validator::ValidationErrors) -> Self {
        let message = errors
            .field_errors()
            .iter()
            .map(|(field, field_errors)| {
                let messages: Vec<String> = field_errors
                    .iter()
                    .map(|e| {
                        e.message.as_ref().map_or("Invalid value".to_string(), |m| m.to_string())
                    })
                    .collect();
                format!("{}: {}", field, messages.join(", "))
            })
            .collect::<Vec<_>>()
            .join("; ");

        Self::validation(message)
    }
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Self::internal(format!("JSON serialization failed: {}", error))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::config("bad port");
        assert!(matches!(error, Error::Config(_)));
        assert_eq!(error.to_string(), "Configuration error: bad port");
    }

    #[test]
    fn test_auth_error() {
        let error = Error::auth("Invalid token", AuthErrorType::InvalidToken);
        assert!(matches!(error, Error::Auth { .. }));
        if let Error::Auth { error_type, .. } = error {
            assert_eq!(error_type, AuthErrorType::InvalidToken);
        }
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(Error::validation("test").status_code(), 400);
        assert_eq!(Error::auth("test", AuthErrorType::InvalidToken).status_code(), 401);
        assert_eq!(Error::auth("test", AuthErrorType::ExpiredToken).status_code(), 401);
        assert_eq!(
            Error::auth("test", AuthErrorType::InsufficientPermissions).status_code(),
            403
        );
        assert_eq!(Error::not_found("user", "u-1").status_code(), 404);
        assert_eq!(Error::conflict("email taken").status_code(), 409);
        assert_eq!(Error::RateLimit { retry_after: 30 }.status_code(), 429);
        assert_eq!(Error::internal("test").status_code(), 500);
    }

    #[test]
    fn test_auth_error_type_display() {
        assert_eq!(AuthErrorType::InvalidCredentials.to_string(), "invalid_credentials");
        assert_eq!(AuthErrorType::InvalidToken.to_string(), "invalid_token");
        assert_eq!(AuthErrorType::ExpiredToken.to_string(), "expired_token");
        assert_eq!(AuthErrorType::MissingToken.to_string(), "missing_token");
        assert_eq!(AuthErrorType::RevokedToken.to_string(), "revoked_token");
    }
}
