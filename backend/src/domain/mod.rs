//! Transport-agnostic core of the city graph service.
//!
//! The domain owns the graph model, the cache/source ports, the tiered
//! retrieval orchestrator, and the edge projection. Adapters under
//! `outbound` and `inbound` depend on this module, never the reverse.

pub mod error;
pub mod graph;
pub mod graph_service;
pub mod place;
pub mod ports;
pub mod projection;

pub use error::GraphError;
pub use graph::{EdgeFeature, EdgeFeatureCollection, GraphEdge, GraphNode, NetworkGraph, NodeId};
pub use graph_service::GraphService;
pub use place::{CacheKey, PlaceQuery};
pub use projection::project;
