//! Repository implementations for persistent entities.

mod user;

pub use user::{SqlxUserRepository, UserRepository};
