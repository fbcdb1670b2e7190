//! Road-network graph model and the cached-blob codec.
//!
//! The graph is the explicit shape the rest of the system works with: the
//! external source's native payload is converted into it immediately at the
//! outbound boundary and never propagated further. Blobs are the serialised
//! form stored by the cache tiers; they are written wholesale and replaced
//! wholesale, never patched.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// OSM node identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub i64);

/// A graph node carrying its geographic position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Stable node identifier.
    pub id: NodeId,
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
}

/// A directed edge with its geometry and attribute map.
///
/// Geometry is a sequence of `[lon, lat]` pairs ordered from the source
/// node towards the target node. Attributes are kept in a `BTreeMap` so the
/// serialised form is deterministic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Node the edge leaves from.
    pub source: NodeId,
    /// Node the edge arrives at.
    pub target: NodeId,
    /// Coordinate sequence as `[lon, lat]` pairs.
    pub geometry: Vec<[f64; 2]>,
    /// Per-edge attributes (road class, name, length, ...).
    pub attributes: BTreeMap<String, Value>,
}

/// An in-memory directed road network for one place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NetworkGraph {
    /// Place name the graph was retrieved for.
    pub place_name: String,
    /// When the graph was fetched from the external source.
    pub fetched_at: DateTime<Utc>,
    /// Nodes with coordinates.
    pub nodes: Vec<GraphNode>,
    /// Directed edges with geometry and attributes.
    pub edges: Vec<GraphEdge>,
}

impl NetworkGraph {
    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of directed edges.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Serialise the graph into a cacheable blob.
    ///
    /// # Errors
    ///
    /// Returns the underlying serialisation error; attribute values are
    /// plain JSON so this only fails on pathological inputs.
    pub fn to_blob(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }

    /// Reconstruct a graph from a cached blob.
    ///
    /// # Errors
    ///
    /// Returns the underlying deserialisation error; callers in the
    /// orchestrator treat this as a cache miss rather than a failure.
    pub fn from_blob(blob: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(blob)
    }
}

/// One projected edge: geometry plus its attribute map, unchanged.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EdgeFeature {
    /// Coordinate sequence as `[lon, lat]` pairs, source to target.
    pub geometry: Vec<[f64; 2]>,
    /// Attributes carried through from the graph edge.
    pub attributes: BTreeMap<String, Value>,
}

/// Ordered collection of projected edges.
///
/// Never cached: it is recomputed per request from a cached or fresh graph,
/// keeping derived artifacts reproducible from the graph itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EdgeFeatureCollection {
    /// Features in graph edge order.
    pub features: Vec<EdgeFeature>,
}

impl EdgeFeatureCollection {
    /// Number of features.
    #[must_use]
    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// Whether the collection holds no features.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}
