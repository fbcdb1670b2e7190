//! Edge projection: graph to renderable feature collection.
//!
//! A pure transform with no I/O. Every edge becomes one feature whose
//! coordinate sequence runs from the source node towards the target node
//! and whose attribute map is carried through unchanged; renaming or
//! filtering attributes is a presentation-layer concern.

use std::collections::HashMap;

use super::error::GraphError;
use super::graph::{EdgeFeature, EdgeFeatureCollection, GraphNode, NetworkGraph, NodeId};

/// Project a graph into its edge feature collection.
///
/// A zero-edge graph with valid nodes is legal and yields an empty
/// collection. Edges without stored geometry get a straight
/// source-to-target segment; geometry stored target-first is reversed so
/// the winding order is fixed.
///
/// # Errors
///
/// [`GraphError::InvalidGraph`] when the graph has zero nodes.
pub fn project(graph: &NetworkGraph) -> Result<EdgeFeatureCollection, GraphError> {
    if graph.nodes.is_empty() {
        return Err(GraphError::invalid_graph(
            "graph has zero nodes, projection is meaningless",
        ));
    }

    // Indexed once; endpoint lookups run twice per edge.
    let nodes: HashMap<NodeId, &GraphNode> =
        graph.nodes.iter().map(|node| (node.id, node)).collect();

    let features = graph
        .edges
        .iter()
        .map(|edge| EdgeFeature {
            geometry: oriented_geometry(
                &edge.geometry,
                nodes.get(&edge.source).copied(),
                nodes.get(&edge.target).copied(),
            ),
            attributes: edge.attributes.clone(),
        })
        .collect();

    Ok(EdgeFeatureCollection { features })
}

/// Return the edge geometry ordered source to target.
///
/// Falls back to a synthesised straight segment when no geometry is stored
/// and both endpoints are known; an edge with neither is emitted with an
/// empty sequence rather than dropped, so collection length always equals
/// edge count.
fn oriented_geometry(
    geometry: &[[f64; 2]],
    source: Option<&GraphNode>,
    target: Option<&GraphNode>,
) -> Vec<[f64; 2]> {
    if geometry.is_empty() {
        return match (source, target) {
            (Some(s), Some(t)) => vec![[s.lon, s.lat], [t.lon, t.lat]],
            _ => Vec::new(),
        };
    }

    if let (Some(s), Some(first), Some(last)) = (source, geometry.first(), geometry.last()) {
        let start = [s.lon, s.lat];
        if squared_distance(*last, start) < squared_distance(*first, start) {
            let mut reversed = geometry.to_vec();
            reversed.reverse();
            return reversed;
        }
    }
    geometry.to_vec()
}

fn squared_distance(a: [f64; 2], b: [f64; 2]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    dx * dx + dy * dy
}
