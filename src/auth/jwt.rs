//! JWT issuance and verification.
//!
//! Access and refresh tokens are signed with distinct HMAC secrets so that a
//! refresh token can never pass access-token verification or vice versa. Each
//! token carries a fresh UUID `jti`, which the session cache uses as the
//! revocation handle.

use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};
use uuid::Uuid;

use crate::auth::user::User;
use crate::config::AuthConfig;
use crate::errors::{AuthErrorType, Error, Result};

/// Access token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,
    pub email: String,
    pub role: String,
    /// Token identifier used for revocation
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

/// Refresh token claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (user id)
    pub sub: String,
    pub jti: String,
    pub iat: usize,
    pub exp: usize,
}

/// Signs and verifies the two token families.
pub struct TokenIssuer {
    access_encoding: EncodingKey,
    access_decoding: DecodingKey,
    refresh_encoding: EncodingKey,
    refresh_decoding: DecodingKey,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
    validation: Validation,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        Self {
            access_encoding: EncodingKey::from_secret(config.access_secret.as_bytes()),
            access_decoding: DecodingKey::from_secret(config.access_secret.as_bytes()),
            refresh_encoding: EncodingKey::from_secret(config.refresh_secret.as_bytes()),
            refresh_decoding: DecodingKey::from_secret(config.refresh_secret.as_bytes()),
            access_ttl_seconds: config.access_ttl_seconds,
            refresh_ttl_seconds: config.refresh_ttl_seconds,
            validation: Validation::default(),
        }
    }

    pub fn access_ttl_seconds(&self) -> u64 {
        self.access_ttl_seconds
    }

    pub fn refresh_ttl_seconds(&self) -> u64 {
        self.refresh_ttl_seconds
    }

    fn now() -> Result<usize> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::internal(format!("System clock is before Unix epoch: {}", e)))?;
        Ok(now.as_secs() as usize)
    }

    /// Issue an access token for the given user. Returns the encoded token
    /// together with its claims so the caller can register the `jti`.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, Claims)> {
        let now = Self::now()?;
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.access_ttl_seconds as usize,
        };

        let token = encode(&Header::default(), &claims, &self.access_encoding)
            .map_err(|e| Error::internal(format!("Failed to sign access token: {}", e)))?;

        Ok((token, claims))
    }

    /// Issue a refresh token for the given user.
    pub fn issue_refresh_token(&self, user: &User) -> Result<(String, RefreshClaims)> {
        let now = Self::now()?;
        let claims = RefreshClaims {
            sub: user.id.to_string(),
            jti: Uuid::new_v4().to_string(),
            iat: now,
            exp: now + self.refresh_ttl_seconds as usize,
        };

        let token = encode(&Header::default(), &claims, &self.refresh_encoding)
            .map_err(|e| Error::internal(format!("Failed to sign refresh token: {}", e)))?;

        Ok((token, claims))
    }

    /// Verify an access token and return its claims.
    pub fn verify_access_token(&self, token: &str) -> Result<Claims> {
        decode::<Claims>(token, &self.access_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }

    /// Verify a refresh token and return its claims.
    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims> {
        decode::<RefreshClaims>(token, &self.refresh_decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(map_jwt_error)
    }
}

fn map_jwt_error(err: jsonwebtoken::errors::Error) -> Error {
    match err.kind() {
        ErrorKind::ExpiredSignature => Error::auth("Token has expired", AuthErrorType::ExpiredToken),
        _ => Error::auth("Invalid token", AuthErrorType::InvalidToken),
    }
}
