//! # userhub
//!
//! User account REST API with JWT authentication and cache-backed session
//! revocation. Components are wired by explicit constructor injection at
//! startup; there are no global singletons.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod domain;
pub mod errors;
pub mod observability;
pub mod startup;
pub mod storage;

pub use errors::{Error, Result};
