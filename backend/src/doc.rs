//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the REST API: the graph endpoints, the health probes, and the error
//! envelope schema. The generated document backs Swagger UI in debug
//! builds.

use utoipa::OpenApi;

use crate::inbound::http::error::{ApiError, ErrorCode};
use crate::inbound::http::graphs::{
    CenterDto, CityResponse, FeatureCollectionDto, FeatureDto, GeometryDto, GraphResponse,
    GraphStats,
};

/// OpenAPI document for the REST API.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "City graph service API",
        description = "Cached retrieval of city road networks and their renderable edge geometry."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    paths(
        crate::inbound::http::graphs::city_summary,
        crate::inbound::http::graphs::graph_geometry,
        crate::api::health::ready,
        crate::api::health::live,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        CityResponse,
        GraphResponse,
        GraphStats,
        CenterDto,
        GeometryDto,
        FeatureDto,
        FeatureCollectionDto,
    ))
)]
pub struct ApiDoc;
