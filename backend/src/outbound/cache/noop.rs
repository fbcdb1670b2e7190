//! No-op stand-in for an unconfigured fast cache tier.

use async_trait::async_trait;

use crate::domain::ports::{GraphCache, GraphCacheError};
use crate::domain::place::CacheKey;

/// Cache implementation that always misses and discards writes.
///
/// Wired in when no Redis URL is configured or the initial connection
/// fails, keeping the orchestrator's tier logic branch-free.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopGraphCache;

impl NoopGraphCache {
    /// Create a new no-op cache instance.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl GraphCache for NoopGraphCache {
    async fn get(&self, _key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError> {
        Ok(None)
    }

    async fn put(&self, _key: &CacheKey, _blob: &[u8]) -> Result<(), GraphCacheError> {
        Ok(())
    }
}
