//! Domain-level error taxonomy.
//!
//! These errors are transport agnostic; the inbound HTTP adapter maps them
//! to status codes and response envelopes. Cache-tier failures never appear
//! here: both tiers degrade to a miss inside the orchestrator and are only
//! logged, so they can affect latency but never correctness.

use thiserror::Error;

use super::ports::NetworkSourceError;

/// Failures surfaced to callers of the graph retrieval pipeline.
#[derive(Debug, Error)]
pub enum GraphError {
    /// The place query is blank or otherwise unusable.
    #[error("invalid place query: {message}")]
    InvalidQuery {
        /// Reason the query was rejected.
        message: String,
    },
    /// Both cache tiers missed and the external source call failed.
    #[error("failed to retrieve network for '{place}'")]
    Retrieval {
        /// Place name the caller asked for.
        place: String,
        /// Underlying source failure.
        #[source]
        source: NetworkSourceError,
    },
    /// The graph is structurally empty in a way that makes projection
    /// meaningless.
    #[error("graph cannot be projected: {message}")]
    InvalidGraph {
        /// Description of the structural problem.
        message: String,
    },
}

impl GraphError {
    /// Helper for rejected place queries.
    pub fn invalid_query(message: impl Into<String>) -> Self {
        Self::InvalidQuery {
            message: message.into(),
        }
    }

    /// Helper wrapping a source failure with the place it was issued for.
    pub fn retrieval(place: impl Into<String>, source: NetworkSourceError) -> Self {
        Self::Retrieval {
            place: place.into(),
            source,
        }
    }

    /// Helper for projection precondition violations.
    pub fn invalid_graph(message: impl Into<String>) -> Self {
        Self::InvalidGraph {
            message: message.into(),
        }
    }
}
