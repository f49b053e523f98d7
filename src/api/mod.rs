//! # HTTP API
//!
//! REST surface: router assembly, handlers, error mapping, rate limiting,
//! OpenAPI document, and the server loop.

pub mod docs;
pub mod error;
pub mod handlers;
pub mod rate_limit;
pub mod routes;
pub mod server;

pub use error::ApiError;
pub use routes::{build_router, ApiState};
pub use server::start_server;
