//! # Authentication and Account Management
//!
//! Credential verification, JWT issuance with cache-backed revocation, and
//! the user CRUD service. Session state lives in the [`crate::cache`] module;
//! everything here is wired by explicit constructor injection.

pub mod hashing;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod service;
pub mod session;
pub mod user;
pub mod user_service;

pub use jwt::{Claims, RefreshClaims, TokenIssuer};
pub use models::{AuthContext, AuthResponse, LoginRequest, RefreshRequest, RegisterRequest, TokenPairResponse};
pub use service::AuthService;
pub use session::SessionStore;
pub use user::{NewUser, Role, UpdateUser, User, UserResponse};
pub use user_service::{PageParams, UpdateUserRequest, UserPage, UserService};
