//! DTOs for decoding Overpass JSON responses into the domain graph.
//!
//! The adapter decodes into these transport DTOs first, then maps into a
//! [`NetworkGraph`] in one pass: nodes deduplicated by id, one directed
//! edge per way, and a reverse edge added for two-way roads.

use std::collections::BTreeMap;

use chrono::Utc;
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::graph::{GraphEdge, GraphNode, NetworkGraph, NodeId};

/// Mean Earth radius in metres, for haversine edge lengths.
const EARTH_RADIUS_METRES: f64 = 6_371_000.0;

#[derive(Debug, Deserialize)]
pub(super) struct OverpassResponseDto {
    #[serde(default)]
    pub(super) elements: Vec<OverpassElementDto>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassElementDto {
    #[serde(rename = "type")]
    pub(super) element_type: String,
    pub(super) id: i64,
    #[serde(default)]
    pub(super) nodes: Vec<i64>,
    #[serde(default)]
    pub(super) geometry: Vec<OverpassPointDto>,
    #[serde(default)]
    pub(super) tags: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
pub(super) struct OverpassPointDto {
    pub(super) lon: f64,
    pub(super) lat: f64,
}

impl OverpassResponseDto {
    /// Build the domain graph from decoded way elements.
    ///
    /// Returns a decode-level message when a way's node list and geometry
    /// disagree or contain non-finite coordinates; ways that are not
    /// drivable roads were already filtered by the query.
    pub(super) fn into_network_graph(self, place_name: &str) -> Result<NetworkGraph, String> {
        let mut nodes: BTreeMap<NodeId, GraphNode> = BTreeMap::new();
        let mut edges: Vec<GraphEdge> = Vec::new();

        for way in self
            .elements
            .into_iter()
            .filter(|element| element.element_type == "way")
        {
            way.validate()?;
            let endpoints = match (way.nodes.first(), way.nodes.last()) {
                (Some(&first), Some(&last)) => (NodeId(first), NodeId(last)),
                _ => continue, // degenerate way without nodes
            };

            for (&node_id, point) in way.nodes.iter().zip(way.geometry.iter()) {
                nodes.entry(NodeId(node_id)).or_insert(GraphNode {
                    id: NodeId(node_id),
                    lat: point.lat,
                    lon: point.lon,
                });
            }

            let forward: Vec<[f64; 2]> = way
                .geometry
                .iter()
                .map(|point| [point.lon, point.lat])
                .collect();
            let attributes = way_attributes(&way.tags, polyline_length_metres(&forward));
            let two_way = !matches!(way.tags.get("oneway").map(String::as_str), Some("yes" | "1"));

            if two_way {
                let mut backward = forward.clone();
                backward.reverse();
                edges.push(GraphEdge {
                    source: endpoints.1,
                    target: endpoints.0,
                    geometry: backward,
                    attributes: attributes.clone(),
                });
            }
            edges.push(GraphEdge {
                source: endpoints.0,
                target: endpoints.1,
                geometry: forward,
                attributes,
            });
        }

        Ok(NetworkGraph {
            place_name: place_name.to_owned(),
            fetched_at: Utc::now(),
            nodes: nodes.into_values().collect(),
            edges,
        })
    }
}

impl OverpassElementDto {
    fn validate(&self) -> Result<(), String> {
        if self.nodes.len() != self.geometry.len() {
            return Err(format!(
                "way {} has {} node ids but {} geometry points",
                self.id,
                self.nodes.len(),
                self.geometry.len()
            ));
        }
        if self
            .geometry
            .iter()
            .any(|point| !point.lon.is_finite() || !point.lat.is_finite())
        {
            return Err(format!("way {} includes non-finite coordinates", self.id));
        }
        Ok(())
    }
}

/// Tags carried through unchanged, plus the computed length in metres.
fn way_attributes(tags: &BTreeMap<String, String>, length_metres: f64) -> BTreeMap<String, Value> {
    let mut attributes: BTreeMap<String, Value> = tags
        .iter()
        .map(|(key, value)| (key.clone(), json!(value)))
        .collect();
    attributes.insert("length".to_owned(), json!(length_metres));
    attributes
}

/// Sum of haversine segment lengths along a `[lon, lat]` polyline.
fn polyline_length_metres(points: &[[f64; 2]]) -> f64 {
    points
        .windows(2)
        .map(|pair| haversine_metres(pair[0], pair[1]))
        .sum()
}

fn haversine_metres(a: [f64; 2], b: [f64; 2]) -> f64 {
    let (lon_a, lat_a) = (a[0].to_radians(), a[1].to_radians());
    let (lon_b, lat_b) = (b[0].to_radians(), b[1].to_radians());
    let d_lat = lat_b - lat_a;
    let d_lon = lon_b - lon_a;
    let h = (d_lat / 2.0).sin().powi(2) + lat_a.cos() * lat_b.cos() * (d_lon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METRES * h.sqrt().asin()
}
