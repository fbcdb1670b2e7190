//! Shared HTTP adapter state.
//!
//! Handlers receive this via `actix_web::web::Data` so they depend only on
//! the domain service and remain testable without real adapters.

use std::sync::Arc;

use crate::domain::GraphService;

/// Dependency bundle for the graph HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Tiered graph retrieval service.
    pub graphs: Arc<GraphService>,
}

impl HttpState {
    /// Bundle the graph service for handler injection.
    #[must_use]
    pub fn new(graphs: Arc<GraphService>) -> Self {
        Self { graphs }
    }
}
