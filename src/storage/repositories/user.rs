//! User repository
//!
//! CRUD operations for user accounts, including the password-hash lookup used
//! during authentication.

use crate::auth::user::{NewUser, Role, UpdateUser, User};
use crate::domain::UserId;
use crate::errors::{Error, Result};
use crate::storage::DbPool;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::str::FromStr;
use tracing::instrument;

#[derive(Debug, Clone, FromRow)]
struct UserRow {
    pub id: String,
    pub email: String,
    pub name: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Create a new user
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Get a user by ID
    async fn get_user(&self, id: &UserId) -> Result<Option<User>>;

    /// Get a user by email
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;

    /// Get a user with their password hash for authentication
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>>;

    /// Update a user's details
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User>;

    /// Update a user's password hash
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<()>;

    /// List all users (with pagination)
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>>;

    /// Count total users
    async fn count_users(&self) -> Result<i64>;

    /// Delete a user
    async fn delete_user(&self, id: &UserId) -> Result<()>;
}

#[derive(Debug, Clone)]
pub struct SqlxUserRepository {
    pool: DbPool,
}

impl SqlxUserRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn row_to_user(&self, row: UserRow) -> Result<User> {
        let role = Role::from_str(&row.role)
            .map_err(|_| Error::validation(format!("Unknown user role '{}'", row.role)))?;

        Ok(User {
            id: UserId::from_string(row.id),
            email: row.email,
            name: row.name,
            role,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    #[instrument(skip(self, user), fields(user_email = %user.email, user_id = %user.id), name = "db_create_user")]
    async fn create_user(&self, user: NewUser) -> Result<User> {
        let id = user.id.to_string();
        let role = user.role.to_string();

        sqlx::query(
            r#"
            INSERT INTO users (id, email, name, password_hash, role, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(&id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.password_hash)
        .bind(&role)
        .bind(Utc::now())
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            // Unique index on email; translate constraint violation into a
            // conflict so concurrent registrations surface as 409.
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::conflict(format!("User with email '{}' already exists", user.email))
            }
            _ => Error::Database { source: err, context: "Failed to create user".to_string() },
        })?;

        self.get_user(&user.id)
            .await?
            .ok_or_else(|| Error::internal("User not found after creation"))
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_get_user")]
    async fn get_user(&self, id: &UserId) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(id.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_by_email")]
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user by email".to_string(),
        })?;

        row.map(|r| self.row_to_user(r)).transpose()
    }

    #[instrument(skip(self), fields(user_email = %email), name = "db_get_user_with_password")]
    async fn get_user_with_password(&self, email: &str) -> Result<Option<(User, String)>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to fetch user with password".to_string(),
        })?;

        if let Some(row) = row {
            let password_hash = row.password_hash.clone();
            let user = self.row_to_user(row)?;
            Ok(Some((user, password_hash)))
        } else {
            Ok(None)
        }
    }

    #[instrument(skip(self, update), fields(user_id = %id), name = "db_update_user")]
    async fn update_user(&self, id: &UserId, update: UpdateUser) -> Result<User> {
        let current =
            self.get_user(id).await?.ok_or_else(|| Error::not_found("User", id.to_string()))?;

        let email = update.email.unwrap_or(current.email);
        let name = update.name.unwrap_or(current.name);
        let role = update.role.unwrap_or(current.role).to_string();

        sqlx::query(
            r#"
            UPDATE users
            SET email = $1, name = $2, role = $3, updated_at = $4
            WHERE id = $5
            "#,
        )
        .bind(&email)
        .bind(&name)
        .bind(&role)
        .bind(Utc::now())
        .bind(id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|err| match &err {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Error::conflict(format!("User with email '{}' already exists", email))
            }
            _ => Error::Database { source: err, context: "Failed to update user".to_string() },
        })?;

        self.get_user(id).await?.ok_or_else(|| Error::internal("User not found after update"))
    }

    #[instrument(skip(self, password_hash), fields(user_id = %id), name = "db_update_password")]
    async fn update_password(&self, id: &UserId, password_hash: String) -> Result<()> {
        let result = sqlx::query("UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3")
            .bind(&password_hash)
            .bind(Utc::now())
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to update password".to_string(),
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id.to_string()));
        }

        Ok(())
    }

    #[instrument(skip(self), fields(limit = limit, offset = offset), name = "db_list_users")]
    async fn list_users(&self, limit: i64, offset: i64) -> Result<Vec<User>> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, name, password_hash, role, created_at, updated_at FROM users ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(|err| Error::Database {
            source: err,
            context: "Failed to list users".to_string(),
        })?;

        rows.into_iter().map(|r| self.row_to_user(r)).collect()
    }

    #[instrument(skip(self), name = "db_count_users")]
    async fn count_users(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to count users".to_string(),
            })?;

        Ok(count)
    }

    #[instrument(skip(self), fields(user_id = %id), name = "db_delete_user")]
    async fn delete_user(&self, id: &UserId) -> Result<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|err| Error::Database {
                source: err,
                context: "Failed to delete user".to_string(),
            })?;

        if result.rows_affected() == 0 {
            return Err(Error::not_found("User", id.to_string()));
        }

        Ok(())
    }
}
