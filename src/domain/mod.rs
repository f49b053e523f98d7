//! Domain types shared across the service.

mod id;

pub use id::UserId;
