//! City graph HTTP handlers.
//!
//! ```text
//! GET /api/v1/city?place=Volgograd,%20Russia
//! GET /api/v1/graph?place=Volgograd,%20Russia
//! ```
//!
//! Thin adapters over the retrieval pipeline: `/city` returns a summary of
//! the cached-or-fetched graph, `/graph` additionally projects the edges
//! into a GeoJSON feature collection for client-side rendering.

use std::collections::BTreeMap;

use actix_web::{HttpResponse, get, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

use crate::domain::{EdgeFeatureCollection, NetworkGraph, project};
use crate::inbound::http::error::ApiResult;
use crate::inbound::http::state::HttpState;

/// Query parameters shared by the graph endpoints.
#[derive(Debug, Deserialize, IntoParams)]
pub struct PlaceParams {
    /// Free-text place name, e.g. `Volgograd, Russia`.
    pub place: String,
}

/// Node and edge counts for a retrieved graph.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    /// Number of graph nodes.
    pub nodes: usize,
    /// Number of directed edges.
    pub edges: usize,
}

/// Summary payload for `GET /api/v1/city`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CityResponse {
    /// Place name the graph was retrieved for.
    pub place_name: String,
    /// RFC 3339 timestamp of the external fetch that produced the graph.
    pub fetched_at: String,
    /// Graph size summary.
    pub stats: GraphStats,
}

impl From<&NetworkGraph> for CityResponse {
    fn from(graph: &NetworkGraph) -> Self {
        Self {
            place_name: graph.place_name.clone(),
            fetched_at: graph.fetched_at.to_rfc3339(),
            stats: GraphStats {
                nodes: graph.node_count(),
                edges: graph.edge_count(),
            },
        }
    }
}

/// Geographic centre of the rendered extent.
#[derive(Debug, Serialize, ToSchema)]
pub struct CenterDto {
    /// Latitude in WGS84 degrees.
    pub lat: f64,
    /// Longitude in WGS84 degrees.
    pub lon: f64,
}

/// GeoJSON `LineString` geometry.
#[derive(Debug, Serialize, ToSchema)]
pub struct GeometryDto {
    /// Always `LineString`.
    #[serde(rename = "type")]
    pub kind: String,
    /// `[lon, lat]` pairs, source to target.
    #[schema(value_type = Vec<Vec<f64>>)]
    pub coordinates: Vec<[f64; 2]>,
}

/// GeoJSON `Feature` wrapping one projected edge.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureDto {
    /// Always `Feature`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Edge geometry.
    pub geometry: GeometryDto,
    /// Edge attributes, unchanged from the graph.
    pub properties: BTreeMap<String, Value>,
}

/// GeoJSON `FeatureCollection` of projected edges.
#[derive(Debug, Serialize, ToSchema)]
pub struct FeatureCollectionDto {
    /// Always `FeatureCollection`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Projected edges in graph order.
    pub features: Vec<FeatureDto>,
}

impl From<EdgeFeatureCollection> for FeatureCollectionDto {
    fn from(collection: EdgeFeatureCollection) -> Self {
        Self {
            kind: "FeatureCollection".to_owned(),
            features: collection
                .features
                .into_iter()
                .map(|feature| FeatureDto {
                    kind: "Feature".to_owned(),
                    geometry: GeometryDto {
                        kind: "LineString".to_owned(),
                        coordinates: feature.geometry,
                    },
                    properties: feature.attributes,
                })
                .collect(),
        }
    }
}

/// Render payload for `GET /api/v1/graph`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GraphResponse {
    /// `[min_lon, min_lat, max_lon, max_lat]` over all nodes.
    #[schema(value_type = Vec<f64>)]
    pub bbox: [f64; 4],
    /// Centre of the bounding box.
    pub center: CenterDto,
    /// Graph size summary.
    pub stats: GraphStats,
    /// Projected edges as GeoJSON.
    pub edges: FeatureCollectionDto,
}

fn bounding_box(graph: &NetworkGraph) -> [f64; 4] {
    let mut bbox = [f64::INFINITY, f64::INFINITY, f64::NEG_INFINITY, f64::NEG_INFINITY];
    for node in &graph.nodes {
        bbox[0] = bbox[0].min(node.lon);
        bbox[1] = bbox[1].min(node.lat);
        bbox[2] = bbox[2].max(node.lon);
        bbox[3] = bbox[3].max(node.lat);
    }
    bbox
}

/// Fetch-or-cache a city's road network and return a summary.
#[utoipa::path(
    get,
    path = "/api/v1/city",
    params(PlaceParams),
    responses(
        (status = 200, description = "Graph summary", body = CityResponse),
        (status = 400, description = "Blank place name"),
        (status = 404, description = "Place did not resolve to a road network"),
        (status = 502, description = "Map-data source unavailable")
    )
)]
#[get("/city")]
pub async fn city_summary(
    state: web::Data<HttpState>,
    params: web::Query<PlaceParams>,
) -> ApiResult<HttpResponse> {
    let graph = state.graphs.get_graph(&params.place).await?;
    Ok(HttpResponse::Ok().json(CityResponse::from(&graph)))
}

/// Fetch-or-cache a city's road network and return renderable edge
/// geometry.
#[utoipa::path(
    get,
    path = "/api/v1/graph",
    params(PlaceParams),
    responses(
        (status = 200, description = "Projected edge geometry", body = GraphResponse),
        (status = 400, description = "Blank place name"),
        (status = 404, description = "Place did not resolve to a road network"),
        (status = 502, description = "Map-data source unavailable")
    )
)]
#[get("/graph")]
pub async fn graph_geometry(
    state: web::Data<HttpState>,
    params: web::Query<PlaceParams>,
) -> ApiResult<HttpResponse> {
    let graph = state.graphs.get_graph(&params.place).await?;
    let collection = project(&graph)?;

    let bbox = bounding_box(&graph);
    let response = GraphResponse {
        bbox,
        center: CenterDto {
            lat: (bbox[1] + bbox[3]) / 2.0,
            lon: (bbox[0] + bbox[2]) / 2.0,
        },
        stats: GraphStats {
            nodes: graph.node_count(),
            edges: graph.edge_count(),
        },
        edges: collection.into(),
    };
    Ok(HttpResponse::Ok().json(response))
}
