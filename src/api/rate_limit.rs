//! Rate limiting middleware.
//!
//! Fixed-window counting delegated to the session cache, so limits hold
//! across instances when Redis backs the cache. Requests are keyed by the
//! authenticated user id when available, otherwise by client IP.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::Request,
    middleware::Next,
    response::Response,
};
use tracing::{debug, warn};

use crate::api::error::ApiError;
use crate::auth::models::AuthContext;
use crate::cache::SessionCache;
use crate::config::RateLimitConfig;
use crate::errors::Error;

/// Shared state for the rate limiting middleware.
#[derive(Clone)]
pub struct RateLimitState {
    pub cache: Arc<dyn SessionCache>,
    pub max_requests: u64,
    pub window_seconds: u64,
}

impl RateLimitState {
    pub fn new(cache: Arc<dyn SessionCache>, config: &RateLimitConfig) -> Self {
        Self { cache, max_requests: config.max_requests, window_seconds: config.window_seconds }
    }
}

/// Identify the caller: authenticated user id first, then forwarded client
/// IP, then the socket peer address.
fn identify(request: &Request<Body>) -> String {
    if let Some(context) = request.extensions().get::<AuthContext>() {
        return format!("user:{}", context.user_id);
    }

    if let Some(forwarded) = request
        .headers()
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty())
    {
        return format!("ip:{}", forwarded);
    }

    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return format!("ip:{}", addr.ip());
    }

    "ip:unknown".to_string()
}

/// Middleware entry point enforcing the request ceiling per identifier.
pub async fn rate_limit(
    State(state): State<RateLimitState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let identifier = identify(&request);
    let key = format!("rateLimit:{}", identifier);

    let count = state.cache.incr_window(&key, state.window_seconds).await.map_err(ApiError::from)?;

    if count > state.max_requests {
        warn!(
            identifier = %identifier,
            count = count,
            max_requests = state.max_requests,
            "rate limit exceeded"
        );
        return Err(ApiError::from(Error::RateLimit { retry_after: state.window_seconds }));
    }

    debug!(identifier = %identifier, count = count, "rate limit check passed");
    Ok(next.run(request).await)
}
