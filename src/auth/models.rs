//! Request/response DTOs for the authentication endpoints.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::user::{Role, UserResponse};
use crate::domain::UserId;

/// User authentication credentials.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password cannot be empty"))]
    pub password: String,
}

/// Request to create a new account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: String,
}

/// Request to rotate a refresh token.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    #[validate(length(min = 1, message = "Refresh token cannot be empty"))]
    pub refresh_token: String,
}

/// Freshly issued token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenPairResponse {
    pub access_token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: u64,
}

/// Response for login and registration: the public user projection plus a
/// token pair.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub user: UserResponse,
    pub tokens: TokenPairResponse,
}

/// Authenticated caller identity, inserted into request extensions by the
/// authentication middleware and passed explicitly to handlers.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub jti: String,
}

impl AuthContext {
    /// Whether the caller may act on the given user's resources.
    pub fn can_access_user(&self, target: &UserId) -> bool {
        self.role.is_admin() || &self.user_id == target
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_request_validation() {
        let ok = RegisterRequest {
            email: "alice@example.com".to_string(),
            password: "Sw0rdFish!".to_string(),
            name: "Alice".to_string(),
        };
        assert!(ok.validate().is_ok());

        let bad_email = RegisterRequest { email: "not-an-email".to_string(), ..ok.clone() };
        assert!(bad_email.validate().is_err());

        let short_password = RegisterRequest { password: "short".to_string(), ..ok.clone() };
        assert!(short_password.validate().is_err());

        let empty_name = RegisterRequest { name: String::new(), ..ok };
        assert!(empty_name.validate().is_err());
    }

    #[test]
    fn refresh_request_uses_camel_case() {
        let request: RefreshRequest =
            serde_json::from_str(r#"{"refreshToken":"abc"}"#).unwrap();
        assert_eq!(request.refresh_token, "abc");
    }

    #[test]
    fn token_pair_serializes_camel_case() {
        let tokens = TokenPairResponse {
            access_token: "a".to_string(),
            refresh_token: "r".to_string(),
            expires_in: 900,
        };
        let json = serde_json::to_string(&tokens).unwrap();
        assert!(json.contains("accessToken"));
        assert!(json.contains("refreshToken"));
        assert!(json.contains("expiresIn"));
    }

    #[test]
    fn ownership_check() {
        let owner = UserId::new();
        let context = AuthContext {
            user_id: owner.clone(),
            email: "u@example.com".to_string(),
            role: Role::User,
            jti: "jti".to_string(),
        };

        assert!(context.can_access_user(&owner));
        assert!(!context.can_access_user(&UserId::new()));

        let admin = AuthContext { role: Role::Admin, ..context };
        assert!(admin.can_access_user(&UserId::new()));
    }
}
