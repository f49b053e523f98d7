//! Session registry over the session cache.
//!
//! Implements the revocation contract: an access token is live while
//! `token:<jti>` exists, and a user has at most one live refresh token,
//! stored at `refreshToken:<userId>`. Logout deletes both keys; rotation
//! overwrites the refresh key.

use std::sync::Arc;

use crate::cache::SessionCache;
use crate::domain::UserId;
use crate::errors::Result;

fn access_key(jti: &str) -> String {
    format!("token:{}", jti)
}

fn refresh_key(user_id: &UserId) -> String {
    format!("refreshToken:{}", user_id)
}

/// Typed wrapper around the session cache for auth state.
#[derive(Clone)]
pub struct SessionStore {
    cache: Arc<dyn SessionCache>,
    access_ttl_seconds: u64,
    refresh_ttl_seconds: u64,
}

impl SessionStore {
    pub fn new(
        cache: Arc<dyn SessionCache>,
        access_ttl_seconds: u64,
        refresh_ttl_seconds: u64,
    ) -> Self {
        Self { cache, access_ttl_seconds, refresh_ttl_seconds }
    }

    /// Mark an access token as live.
    pub async fn register_access(&self, jti: &str, user_id: &UserId) -> Result<()> {
        self.cache.set_ex(&access_key(jti), user_id.as_str(), self.access_ttl_seconds).await
    }

    /// Check whether the access token identified by `jti` is still accepted.
    /// Returns the user id it was registered for.
    pub async fn access_user(&self, jti: &str) -> Result<Option<String>> {
        self.cache.get(&access_key(jti)).await
    }

    /// Store the single live refresh token for a user, replacing any
    /// previous one.
    pub async fn store_refresh(&self, user_id: &UserId, refresh_token: &str) -> Result<()> {
        self.cache.set_ex(&refresh_key(user_id), refresh_token, self.refresh_ttl_seconds).await
    }

    /// Load the currently live refresh token for a user.
    pub async fn current_refresh(&self, user_id: &UserId) -> Result<Option<String>> {
        self.cache.get(&refresh_key(user_id)).await
    }

    /// Invalidate one access token and the user's refresh token.
    pub async fn revoke_session(&self, user_id: &UserId, jti: &str) -> Result<()> {
        self.cache.delete(&access_key(jti)).await?;
        self.cache.delete(&refresh_key(user_id)).await?;
        Ok(())
    }

    /// Invalidate the user's refresh token only. Used when an account is
    /// deleted; outstanding access tokens die at their natural TTL.
    pub async fn revoke_refresh(&self, user_id: &UserId) -> Result<()> {
        self.cache.delete(&refresh_key(user_id)).await
    }

    /// Drop every live session in the store. Administrative escape hatch for
    /// secret rotation.
    pub async fn revoke_all_sessions(&self) -> Result<u64> {
        let access = self.cache.delete_pattern("token:*").await?;
        let refresh = self.cache.delete_pattern("refreshToken:*").await?;
        Ok(access + refresh)
    }
}
