//! User management service: CRUD over accounts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::auth::session::SessionStore;
use crate::auth::user::{UpdateUser, User, UserResponse};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::UserRepository;

const MAX_PAGE_SIZE: i64 = 100;
const DEFAULT_PAGE_SIZE: i64 = 20;

/// Request to update an existing account.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[validate(email(message = "Invalid email address"))]
    pub email: Option<String>,
    #[validate(length(min = 1, message = "Name cannot be empty"))]
    pub name: Option<String>,
}

/// Pagination parameters, 1-based.
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PageParams {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

/// One page of users.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserPage {
    pub items: Vec<UserResponse>,
    pub total: i64,
    pub page: i64,
    pub per_page: i64,
}

/// Service exposing account CRUD to the HTTP layer.
#[derive(Clone)]
pub struct UserService {
    repository: Arc<dyn UserRepository>,
    sessions: SessionStore,
}

impl UserService {
    pub fn new(repository: Arc<dyn UserRepository>, sessions: SessionStore) -> Self {
        Self { repository, sessions }
    }

    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn get_user(&self, id: &UserId) -> Result<UserResponse> {
        let user = self
            .repository
            .get_user(id)
            .await?
            .ok_or_else(|| Error::not_found("User", id.to_string()))?;
        Ok(user.into())
    }

    #[instrument(skip(self, request), fields(user_id = %id))]
    pub async fn update_user(&self, id: &UserId, request: UpdateUserRequest) -> Result<UserResponse> {
        request.validate()?;

        let update = UpdateUser {
            email: request.email.map(|e| User::normalize_email(&e)),
            name: request.name.map(|n| n.trim().to_string()),
            role: None,
        };

        let user = self.repository.update_user(id, update).await?;
        info!(user_id = %id, "user updated");
        Ok(user.into())
    }

    /// Delete an account and revoke its refresh token so the session cannot
    /// be extended. Outstanding access tokens die at their natural TTL.
    #[instrument(skip(self), fields(user_id = %id))]
    pub async fn delete_user(&self, id: &UserId) -> Result<()> {
        self.repository.delete_user(id).await?;
        self.sessions.revoke_refresh(id).await?;
        info!(user_id = %id, "user deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn list_users(&self, params: PageParams) -> Result<UserPage> {
        let page = params.page.unwrap_or(1).max(1);
        let per_page = params.per_page.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1) * per_page;

        let users = self.repository.list_users(per_page, offset).await?;
        let total = self.repository.count_users().await?;

        Ok(UserPage {
            items: users.into_iter().map(UserResponse::from).collect(),
            total,
            page,
            per_page,
        })
    }
}
