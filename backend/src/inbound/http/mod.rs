//! Driving HTTP adapter: handlers, DTOs, and the API error envelope.

pub mod error;
pub mod graphs;
pub mod state;

pub use error::{ApiError, ApiResult, ErrorCode};
pub use state::HttpState;

use actix_web::web;

/// Register the versioned API routes.
///
/// Used by both the server bootstrap and integration tests so the wiring
/// cannot drift between them.
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v1")
            .service(graphs::city_summary)
            .service(graphs::graph_geometry),
    );
}
