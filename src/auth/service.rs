//! Authentication service: login, registration, token rotation, logout.

use std::sync::{Arc, LazyLock};

use tracing::{info, instrument, warn};
use validator::Validate;

use crate::auth::hashing;
use crate::auth::jwt::TokenIssuer;
use crate::auth::models::{
    AuthContext, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse,
};
use crate::auth::session::SessionStore;
use crate::auth::user::{NewUser, Role, User};
use crate::domain::UserId;
use crate::errors::{AuthErrorType, Error, Result};
use crate::storage::UserRepository;

/// Pre-computed dummy hash for timing-safe user enumeration prevention.
/// When a non-existent email is used, we still run Argon2 verification against
/// this hash so the response time matches real verification.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    hashing::hash_password("dummy_startup_value")
        .unwrap_or_else(|_| "$argon2id$v=19$m=768,t=1,p=1$dW5rbm93bg$dW5rbm93bg".to_string())
});

/// Service handling the credential and token lifecycle.
#[derive(Clone)]
pub struct AuthService {
    user_repository: Arc<dyn UserRepository>,
    sessions: SessionStore,
    issuer: Arc<TokenIssuer>,
}

impl AuthService {
    pub fn new(
        user_repository: Arc<dyn UserRepository>,
        sessions: SessionStore,
        issuer: Arc<TokenIssuer>,
    ) -> Self {
        Self { user_repository, sessions, issuer }
    }

    /// Issue a fresh access/refresh pair and register it in the session
    /// store. The refresh write replaces any previous token for the user.
    async fn issue_pair(&self, user: &User) -> Result<TokenPairResponse> {
        let (access_token, claims) = self.issuer.issue_access_token(user)?;
        let (refresh_token, _) = self.issuer.issue_refresh_token(user)?;

        self.sessions.register_access(&claims.jti, &user.id).await?;
        self.sessions.store_refresh(&user.id, &refresh_token).await?;

        Ok(TokenPairResponse {
            access_token,
            refresh_token,
            expires_in: self.issuer.access_ttl_seconds(),
        })
    }

    /// Authenticate with email and password.
    ///
    /// Unknown email and wrong password produce the same error so callers
    /// cannot probe which accounts exist.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<AuthResponse> {
        request.validate()?;
        let email = User::normalize_email(&request.email);

        let (user, password_hash) =
            match self.user_repository.get_user_with_password(&email).await? {
                Some(result) => result,
                None => {
                    // Keep response time in line with the hit path.
                    if let Err(e) = hashing::verify_password(&request.password, &DUMMY_HASH) {
                        warn!(error = %e, "dummy hash verification failed unexpectedly");
                    }
                    warn!(email = %email, "login attempt for non-existent user");
                    return Err(Error::auth(
                        "Invalid email or password",
                        AuthErrorType::InvalidCredentials,
                    ));
                }
            };

        if !hashing::verify_password(&request.password, &password_hash)? {
            warn!(user_id = %user.id, email = %email, "login attempt with incorrect password");
            return Err(Error::auth(
                "Invalid email or password",
                AuthErrorType::InvalidCredentials,
            ));
        }

        let tokens = self.issue_pair(&user).await?;
        info!(user_id = %user.id, email = %user.email, "user logged in");

        Ok(AuthResponse { user: user.into(), tokens })
    }

    /// Create a new account and log it in.
    #[instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<AuthResponse> {
        request.validate()?;
        let email = User::normalize_email(&request.email);

        if self.user_repository.get_user_by_email(&email).await?.is_some() {
            return Err(Error::conflict(format!("User with email '{}' already exists", email)));
        }

        let password_hash = hashing::hash_password(&request.password)?;
        let user = self
            .user_repository
            .create_user(NewUser {
                id: UserId::new(),
                email,
                name: request.name.trim().to_string(),
                password_hash,
                role: Role::User,
            })
            .await?;

        let tokens = self.issue_pair(&user).await?;
        info!(user_id = %user.id, email = %user.email, "user registered");

        Ok(AuthResponse { user: user.into(), tokens })
    }

    /// Rotate a refresh token.
    ///
    /// The session store is the authority: the presented token must match
    /// the single stored token byte-for-byte, so an old token dies the
    /// moment a newer one is issued. Concurrent rotations for one user race
    /// on that key and the last writer wins.
    #[instrument(skip(self, request))]
    pub async fn refresh(&self, request: &RefreshRequest) -> Result<TokenPairResponse> {
        request.validate()?;

        let claims = self.issuer.verify_refresh_token(&request.refresh_token)?;
        let user_id = UserId::from_string(claims.sub);

        let user = self
            .user_repository
            .get_user(&user_id)
            .await?
            .ok_or_else(|| Error::auth("Invalid token", AuthErrorType::InvalidToken))?;

        match self.sessions.current_refresh(&user.id).await? {
            Some(stored) if stored == request.refresh_token => {}
            _ => {
                warn!(user_id = %user.id, "refresh attempt with superseded or revoked token");
                return Err(Error::auth(
                    "Refresh token has been revoked",
                    AuthErrorType::RevokedToken,
                ));
            }
        }

        let tokens = self.issue_pair(&user).await?;
        info!(user_id = %user.id, "refresh token rotated");

        Ok(tokens)
    }

    /// Invalidate the caller's session: the presented access token and the
    /// user's refresh token.
    #[instrument(skip(self, context), fields(user_id = %context.user_id))]
    pub async fn logout(&self, context: &AuthContext) -> Result<()> {
        self.sessions.revoke_session(&context.user_id, &context.jti).await?;
        info!(user_id = %context.user_id, "user logged out");
        Ok(())
    }
}
