//! # Session Cache
//!
//! Key-value store backing session revocation and rate limiting. The Redis
//! backend is the production choice and supports multi-instance deployments;
//! the in-memory backend exists for development and tests, where a single
//! process owns all state.

use crate::errors::{Error, Result};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::info;

/// Storage backend for short-lived session state.
///
/// All keys carry a TTL. Expired keys read as absent.
#[async_trait]
pub trait SessionCache: Send + Sync {
    /// Get the value stored at `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` at `key` with the given time to live.
    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()>;

    /// Remove `key`. Removing an absent key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;

    /// Remove every key matching a glob-style pattern (e.g. `token:*`).
    async fn delete_pattern(&self, pattern: &str) -> Result<u64>;

    /// Increment a fixed-window counter, creating it with `window_seconds`
    /// TTL on first increment. Returns the post-increment count.
    async fn incr_window(&self, key: &str, window_seconds: u64) -> Result<u64>;
}

/// Redis-backed session cache using a multiplexed connection manager.
#[derive(Clone)]
pub struct RedisSessionCache {
    manager: ConnectionManager,
    key_prefix: String,
}

impl RedisSessionCache {
    /// Connect to Redis and return a cache handle.
    pub async fn connect(url: &str, key_prefix: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::Cache {
            source: e,
            context: "Invalid Redis URL".to_string(),
        })?;

        let manager = client.get_connection_manager().await.map_err(|e| Error::Cache {
            source: e,
            context: "Failed to connect to Redis".to_string(),
        })?;

        info!(key_prefix = %key_prefix, "Connected to Redis session cache");

        Ok(Self { manager, key_prefix: key_prefix.to_string() })
    }

    fn make_key(&self, key: &str) -> String {
        format!("{}:{}", self.key_prefix, key)
    }
}

#[async_trait]
impl SessionCache for RedisSessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut conn = self.manager.clone();
        let value: Option<String> = redis::cmd("GET")
            .arg(self.make_key(key))
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Cache { source: e, context: "GET failed".to_string() })?;

        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("SET")
            .arg(self.make_key(key))
            .arg(value)
            .arg("EX")
            .arg(ttl_seconds)
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::Cache { source: e, context: "SET failed".to_string() })?;

        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut conn = self.manager.clone();
        redis::cmd("DEL")
            .arg(self.make_key(key))
            .query_async::<()>(&mut conn)
            .await
            .map_err(|e| Error::Cache { source: e, context: "DEL failed".to_string() })?;

        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut conn = self.manager.clone();
        let full_pattern = self.make_key(pattern);
        let mut deleted = 0u64;
        let mut cursor = 0u64;

        loop {
            let (next, keys): (u64, Vec<String>) = redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(&full_pattern)
                .arg("COUNT")
                .arg(100)
                .query_async(&mut conn)
                .await
                .map_err(|e| Error::Cache { source: e, context: "SCAN failed".to_string() })?;

            if !keys.is_empty() {
                let removed: u64 = redis::cmd("DEL")
                    .arg(&keys)
                    .query_async(&mut conn)
                    .await
                    .map_err(|e| Error::Cache { source: e, context: "DEL failed".to_string() })?;
                deleted += removed;
            }

            cursor = next;
            if cursor == 0 {
                break;
            }
        }

        Ok(deleted)
    }

    async fn incr_window(&self, key: &str, window_seconds: u64) -> Result<u64> {
        let mut conn = self.manager.clone();
        let full_key = self.make_key(key);

        let count: u64 = redis::cmd("INCR")
            .arg(&full_key)
            .query_async(&mut conn)
            .await
            .map_err(|e| Error::Cache { source: e, context: "INCR failed".to_string() })?;

        // First hit in the window establishes the TTL.
        if count == 1 {
            redis::cmd("EXPIRE")
                .arg(&full_key)
                .arg(window_seconds)
                .query_async::<()>(&mut conn)
                .await
                .map_err(|e| Error::Cache { source: e, context: "EXPIRE failed".to_string() })?;
        }

        Ok(count)
    }
}

#[derive(Debug, Clone)]
struct MemoryEntry {
    value: String,
    expires_at: Instant,
}

impl MemoryEntry {
    fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }
}

/// In-memory session cache for development and tests.
#[derive(Clone, Default)]
pub struct MemorySessionCache {
    entries: Arc<RwLock<HashMap<String, MemoryEntry>>>,
}

impl MemorySessionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Glob match supporting a single trailing `*`, which is the only
    /// pattern shape the service uses.
    fn matches(pattern: &str, key: &str) -> bool {
        match pattern.strip_suffix('*') {
            Some(prefix) => key.starts_with(prefix),
            None => key == pattern,
        }
    }
}

#[async_trait]
impl SessionCache for MemorySessionCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let entries = self.entries.read().await;
        match entries.get(key) {
            Some(entry) if !entry.is_expired() => Ok(Some(entry.value.clone())),
            _ => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl_seconds: u64) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            MemoryEntry {
                value: value.to_string(),
                expires_at: Instant::now() + Duration::from_secs(ttl_seconds),
            },
        );
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries.remove(key);
        Ok(())
    }

    async fn delete_pattern(&self, pattern: &str) -> Result<u64> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, _| !Self::matches(pattern, key));
        Ok((before - entries.len()) as u64)
    }

    async fn incr_window(&self, key: &str, window_seconds: u64) -> Result<u64> {
        let mut entries = self.entries.write().await;

        let count = match entries.get(key) {
            Some(entry) if !entry.is_expired() => {
                entry.value.parse::<u64>().unwrap_or(0) + 1
            }
            _ => 1,
        };

        let expires_at = if count == 1 {
            Instant::now() + Duration::from_secs(window_seconds)
        } else {
            // Preserve the existing window deadline.
            entries
                .get(key)
                .map(|e| e.expires_at)
                .unwrap_or_else(|| Instant::now() + Duration::from_secs(window_seconds))
        };

        entries.insert(key.to_string(), MemoryEntry { value: count.to_string(), expires_at });

        Ok(count)
    }
}

/// Create a session cache from configuration: Redis when a URL is provided,
/// otherwise the in-memory backend.
pub async fn create_session_cache(
    config: &crate::config::CacheConfig,
) -> Result<Arc<dyn SessionCache>> {
    match &config.url {
        Some(url) => {
            let cache = RedisSessionCache::connect(url, &config.key_prefix).await?;
            Ok(Arc::new(cache))
        }
        None => {
            info!("No Redis URL configured, using in-memory session cache");
            Ok(Arc::new(MemorySessionCache::new()))
        }
    }
}
