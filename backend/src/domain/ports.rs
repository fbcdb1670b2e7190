//! Domain ports defining the edges of the hexagon.
//!
//! Ports describe how the domain expects to interact with driven adapters
//! (the cache tiers and the external map-data source). Each trait exposes
//! strongly typed errors so adapters map their failures into predictable
//! variants instead of returning `anyhow::Result`.

use async_trait::async_trait;
use thiserror::Error;

use super::graph::NetworkGraph;
use super::place::{CacheKey, PlaceQuery};

/// Errors surfaced by a cache tier adapter.
///
/// The orchestrator absorbs every variant: a failing `get` degrades to a
/// miss and a failing `put` to a no-op, so a broken tier costs latency,
/// never correctness.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphCacheError {
    /// Cache backend is unavailable, timing out, or refusing the operation.
    #[error("cache backend failure: {message}")]
    Backend {
        /// Adapter-provided failure description.
        message: String,
    },
}

impl GraphCacheError {
    /// Helper for backend-level failures.
    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}

/// Errors surfaced by the external map-data source adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkSourceError {
    /// The place did not resolve to any road network.
    #[error("no road network found: {message}")]
    NotFound {
        /// Source-provided context.
        message: String,
    },
    /// The request was malformed from the source's point of view.
    #[error("source rejected the request: {message}")]
    InvalidRequest {
        /// Source-provided context.
        message: String,
    },
    /// The source throttled the caller.
    #[error("source rate limited the request: {message}")]
    RateLimited {
        /// Source-provided context.
        message: String,
    },
    /// The bounded request timeout elapsed.
    #[error("source timed out: {message}")]
    Timeout {
        /// Source-provided context.
        message: String,
    },
    /// Connection or protocol failure below the payload level.
    #[error("source transport failure: {message}")]
    Transport {
        /// Source-provided context.
        message: String,
    },
    /// The payload arrived but could not be decoded into a graph.
    #[error("source payload could not be decoded: {message}")]
    Decode {
        /// Source-provided context.
        message: String,
    },
}

impl NetworkSourceError {
    /// Helper for unresolvable places.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound {
            message: message.into(),
        }
    }

    /// Helper for rejected requests.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::InvalidRequest {
            message: message.into(),
        }
    }

    /// Helper for throttling responses.
    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::RateLimited {
            message: message.into(),
        }
    }

    /// Helper for timeouts.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::Timeout {
            message: message.into(),
        }
    }

    /// Helper for transport failures.
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Helper for decode failures.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Cache port shared by the fast and durable tiers.
///
/// Blobs are opaque bytes at this seam; the codec lives on
/// [`NetworkGraph`]. Time-to-live is adapter configuration, not a port
/// parameter, so the orchestrator never branches on tier capabilities.
#[async_trait]
pub trait GraphCache: Send + Sync {
    /// Read the blob stored under `key`, if any. A missing entry is
    /// `Ok(None)`, not an error.
    async fn get(&self, key: &CacheKey) -> Result<Option<Vec<u8>>, GraphCacheError>;

    /// Store `blob` under `key`, replacing any previous entry wholesale.
    async fn put(&self, key: &CacheKey, blob: &[u8]) -> Result<(), GraphCacheError>;
}

/// Port for the external map-data source.
#[async_trait]
pub trait NetworkSource: Send + Sync {
    /// Fetch the road network for a place. Never returns an empty graph as
    /// a substitute for failure.
    async fn fetch_network(&self, place: &PlaceQuery) -> Result<NetworkGraph, NetworkSourceError>;
}
