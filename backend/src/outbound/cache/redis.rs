//! Fast shared cache tier backed by Redis.
//!
//! Uses `bb8-redis` for connection pooling and stores the same serialised
//! blobs as the durable tier under namespaced keys
//! (`city-graph:v1:<key>`). Entries expire: the configured TTL gets a
//! random jitter added so a popular city's entries do not all lapse in the
//! same instant. Every operation is bounded by a timeout, and every
//! failure maps to [`GraphCacheError::Backend`], which the orchestrator
//! degrades to a miss on read and a no-op on write.

use std::time::Duration;

use async_trait::async_trait;
use bb8_redis::bb8::Pool;
use bb8_redis::redis::AsyncCommands;
use bb8_redis::RedisConnectionManager;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use crate::domain::place::CacheKey;
use crate::domain::ports::{GraphCache, GraphCacheError};

/// Version-safe namespace prefix for stored blobs.
const KEY_NAMESPACE: &str = "city-graph:v1";
/// Upper bound of the random TTL jitter, as a fraction of the base TTL.
const JITTER_FRACTION: f64 = 0.1;

/// Redis-backed `GraphCache` for the fast shared tier.
#[derive(Clone)]
pub struct RedisGraphCache {
    pool: Pool<RedisConnectionManager>,
    ttl: Duration,
    op_timeout: Duration,
}

impl RedisGraphCache {
    /// Connect to Redis and verify the connection with a `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`GraphCacheError::Backend`] when the URL is invalid, the
    /// pool cannot be built, or the server does not answer within the
    /// operation timeout. Callers substitute the no-op tier on failure.
    pub async fn connect(
        url: &str,
        ttl: Duration,
        op_timeout: Duration,
    ) -> Result<Self, GraphCacheError> {
        let manager = RedisConnectionManager::new(url)
            .map_err(|error| GraphCacheError::backend(format!("invalid redis url: {error}")))?;
        let pool = Pool::builder()
            .connection_timeout(op_timeout)
            .build(manager)
            .await
            .map_err(|error| GraphCacheError::backend(format!("redis pool: {error}")))?;

        let cache = Self {
            pool,
            ttl,
            op_timeout,
        };
        cache
            .bounded(async {
                let mut conn = cache.pool.get().await.map_err(|error| {
                    GraphCacheError::backend(format!("redis checkout: {error}"))
                })?;
                bb8_redis::redis::cmd("PING")
                    .query_async::<String>(&mut *conn)
                    .await
                    .map_err(|error| GraphCacheError::backend(format!("redis ping: {error}")))
            })
            .await?;
        debug!(ttl_seconds = ttl.as_secs(), "fast cache tier connected");
        Ok(cache)
    }

    /// Namespaced storage key.
    fn storage_key(key: &CacheKey) -> String {
        format!("{KEY_NAMESPACE}:{key}")
    }

    /// TTL with jitter, in whole seconds (at least one).
    fn jittered_ttl_seconds(&self) -> u64 {
        let base = self.ttl.as_secs().max(1);
        let span = ((base as f64) * JITTER_FRACTION) as u64;
        if span == 0 {
            return base;
        }
        let mut rng = SmallRng::from_entropy();
        base + rng.gen_range(0..=span)
    }

    /// Run a cache operation under the configured timeout.
    async fn bounded<T>(
        &self,
        op: impl Future<Output = Result<T, GraphCacheError>>,
    ) -> Result<T, GraphCacheError> {
        tokio::time::timeout(self.op_timeout, op)
            .await
            .map_err(|_| {
                GraphCacheError::backend(format!(
                    "redis operation exceeded {}ms",
                    self.op_timeout.as_millis()
                ))
            })?
    }
}

#[async_trait]
impl GraphCache for RedisGraphCache {
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError> {
        let storage_key = Self::storage_key(key);
        self.bounded(async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|error| GraphCacheError::backend(format!("redis checkout: {error}")))?;
            conn.get::<_, Option<Vec<u8>>>(storage_key)
                .await
                .map_err(|error| GraphCacheError::backend(format!("redis get: {error}")))
        })
        .await
    }

    async fn put(&self, key: &CacheKey, blob: &[u8]) -> Result<(), GraphCacheError> {
        let storage_key = Self::storage_key(key);
        let ttl_seconds = self.jittered_ttl_seconds();
        self.bounded(async {
            let mut conn = self
                .pool
                .get()
                .await
                .map_err(|error| GraphCacheError::backend(format!("redis checkout: {error}")))?;
            conn.set_ex::<_, _, ()>(storage_key, blob, ttl_seconds)
                .await
                .map_err(|error| GraphCacheError::backend(format!("redis set: {error}")))
        })
        .await
    }
}
