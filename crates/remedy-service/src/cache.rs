//! # Coupon Cache
//!
//! The `CouponCache` capability and its implementations.
//!
//! ## Cache-Aside Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Cache-Aside Lookup                                 │
//! │                                                                         │
//! │  validate("SAVE10")                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  cache.get("coupon:SAVE10")                                            │
//! │       │                                                                 │
//! │       ├── hit + decodes  → evaluate                                    │
//! │       │                                                                 │
//! │       ├── miss / error / undecodable                                   │
//! │       │        │                                                        │
//! │       │        ▼                                                        │
//! │       │   store.get_by_code("SAVE10")                                  │
//! │       │        │                                                        │
//! │       │        ▼                                                        │
//! │       │   cache.put(key, bytes, ttl)  ← best-effort                    │
//! │       │        │                                                        │
//! │       └────────┴──► evaluate                                           │
//! │                                                                         │
//! │  A cache failure is never fatal to validation - only a performance     │
//! │  degradation. Eviction is time-based only; there is no invalidation    │
//! │  path, so a store edit can be served stale for up to the TTL.          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The cache is an injected capability (`Arc<dyn CouponCache>`), not a
//! process-wide singleton, so tests can substitute an implementation with
//! deterministic TTL behavior.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;
use tokio::time::Instant;
use tracing::debug;

// =============================================================================
// Contract
// =============================================================================

/// A keyed byte store with per-entry TTL.
///
/// Values are opaque to the cache; the service owns (de)serialization so a
/// poisoned entry degrades to a store read instead of an error.
#[async_trait]
pub trait CouponCache: Send + Sync {
    /// Fetches a cached value. `Ok(None)` is a miss.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError>;

    /// Stores a value with a time-to-live. Entries are replaced wholesale
    /// or not at all - a failed write must never leave a torn entry.
    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError>;
}

/// Cache backend errors.
///
/// Callers treat any of these as a miss; they exist so the degradation can
/// be logged with a cause.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

impl From<redis::RedisError> for CacheError {
    fn from(err: redis::RedisError) -> Self {
        CacheError::Backend(err.to_string())
    }
}

// =============================================================================
// Redis Implementation
// =============================================================================

/// Coupon cache backed by Redis.
///
/// `ConnectionManager` is a cloneable handle that multiplexes over one
/// connection and reconnects on failure, so the cache can be shared across
/// request-scoped tasks without a pool.
#[derive(Clone)]
pub struct RedisCouponCache {
    conn: ConnectionManager,
}

impl RedisCouponCache {
    /// Connects to Redis at the given URL.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url)?;
        let conn = ConnectionManager::new(client).await?;
        debug!("Connected to coupon cache");
        Ok(RedisCouponCache { conn })
    }
}

#[async_trait]
impl CouponCache for RedisCouponCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut conn = self.conn.clone();
        let value: Option<Vec<u8>> = conn.get(key).await?;
        Ok(value)
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.conn.clone();
        // SETEX replaces the value and TTL atomically.
        let () = conn.set_ex(key, value, ttl.as_secs()).await?;
        Ok(())
    }
}

// =============================================================================
// In-Memory Implementation
// =============================================================================

/// In-process coupon cache with per-entry deadlines.
///
/// Used when no Redis URL is configured, and by tests: deadlines are
/// `tokio::time::Instant`s, so under a paused test clock
/// (`#[tokio::test(start_paused = true)]` + `tokio::time::advance`) TTL
/// expiry is fully deterministic.
#[derive(Default)]
pub struct MemoryCouponCache {
    entries: Mutex<HashMap<String, (Vec<u8>, Instant)>>,
}

impl MemoryCouponCache {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CouponCache for MemoryCouponCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, CacheError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| CacheError::Backend("cache lock poisoned".to_string()))?;

        match entries.get(key) {
            Some((value, deadline)) if *deadline > Instant::now() => Ok(Some(value.clone())),
            Some(_) => {
                // Expired: evict lazily on access.
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &[u8], ttl: Duration) -> Result<(), CacheError> {
        let deadline = Instant::now() + ttl;
        self.entries
            .lock()
            .map_err(|_| CacheError::Backend("cache lock poisoned".to_string()))?
            .insert(key.to_string(), (value.to_vec(), deadline));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    #[tokio::test]
    async fn test_memory_cache_round_trip() {
        let cache = MemoryCouponCache::new();

        cache
            .put("coupon:SAVE10", b"payload", Duration::from_secs(300))
            .await
            .unwrap();

        let got = cache.get("coupon:SAVE10").await.unwrap();
        assert_eq!(got.as_deref(), Some(b"payload".as_ref()));

        assert!(cache.get("coupon:OTHER").await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_memory_cache_expires_after_ttl() {
        let cache = MemoryCouponCache::new();

        cache
            .put("coupon:SAVE10", b"payload", Duration::from_secs(300))
            .await
            .unwrap();

        // Just inside the TTL: still there.
        advance(Duration::from_secs(299)).await;
        assert!(cache.get("coupon:SAVE10").await.unwrap().is_some());

        // Past the TTL: gone.
        advance(Duration::from_secs(2)).await;
        assert!(cache.get("coupon:SAVE10").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_memory_cache_put_replaces_wholesale() {
        let cache = MemoryCouponCache::new();

        cache
            .put("k", b"first", Duration::from_secs(60))
            .await
            .unwrap();
        cache
            .put("k", b"second", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get("k").await.unwrap().as_deref(),
            Some(b"second".as_ref())
        );
    }
}
