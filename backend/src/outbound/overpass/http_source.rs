//! Reqwest-backed Overpass source adapter.
//!
//! Owns transport details only: query text construction, request timeout
//! and HTTP error mapping, and JSON decoding into the domain graph. The
//! retry policy, if any, belongs to the caller; this adapter performs one
//! request per fetch.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::OverpassResponseDto;
use crate::domain::graph::NetworkGraph;
use crate::domain::place::PlaceQuery;
use crate::domain::ports::{NetworkSource, NetworkSourceError};

const DEFAULT_QUERY_TIMEOUT_SECONDS: u32 = 180;
const DEFAULT_USER_AGENT: &str = "city-graph-backend/0.1";
const DEFAULT_CONTACT: &str = "ops@city-graph.invalid";

/// Drivable road classes requested from Overpass, mirroring a
/// `network_type=drive` extraction.
const DRIVE_HIGHWAY_CLASSES: &str = "motorway|trunk|primary|secondary|tertiary|unclassified|\
residential|living_street|motorway_link|trunk_link|primary_link|secondary_link|tertiary_link";

/// Outbound identity and query timeout settings for Overpass requests.
pub struct OverpassHttpIdentity {
    /// HTTP user-agent sent to Overpass.
    pub user_agent: String,
    /// Contact header value sent to Overpass.
    pub contact: String,
    /// Timeout directive embedded in the Overpass query text.
    pub query_timeout_seconds: u32,
}

impl Default for OverpassHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            contact: DEFAULT_CONTACT.to_owned(),
            query_timeout_seconds: DEFAULT_QUERY_TIMEOUT_SECONDS,
        }
    }
}

/// Overpass source adapter that performs HTTP POST requests against one
/// endpoint.
pub struct OverpassHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    contact: String,
    query_timeout_seconds: u32,
}

impl OverpassHttpSource {
    /// Build an adapter using a reqwest client with an explicit request
    /// timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(endpoint, timeout, OverpassHttpIdentity::default())
    }

    /// Build an adapter with explicit outbound identity and query timeout.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: OverpassHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            contact: identity.contact,
            query_timeout_seconds: identity.query_timeout_seconds.max(1),
        })
    }
}

#[async_trait]
impl NetworkSource for OverpassHttpSource {
    async fn fetch_network(&self, place: &PlaceQuery) -> Result<NetworkGraph, NetworkSourceError> {
        let query = build_drive_network_query(place, self.query_timeout_seconds)?;
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header("Contact", self.contact.as_str())
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&[("data", query)])
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }

        let graph = parse_network(body.as_ref(), place.as_str())?;
        if graph.edge_count() == 0 {
            return Err(NetworkSourceError::not_found(format!(
                "no drivable road network matched '{place}'"
            )));
        }
        Ok(graph)
    }
}

fn parse_network(body: &[u8], place_name: &str) -> Result<NetworkGraph, NetworkSourceError> {
    let decoded: OverpassResponseDto = serde_json::from_slice(body).map_err(|error| {
        NetworkSourceError::decode(format!("invalid Overpass JSON payload: {error}"))
    })?;
    decoded
        .into_network_graph(place_name)
        .map_err(NetworkSourceError::decode)
}

/// Build the Overpass query selecting drivable ways inside the named area.
///
/// Comma-separated place segments narrow the search from the broadest
/// region down to the target: `"Springfield, Illinois"` resolves the
/// `Illinois` area first and then the administrative boundary named
/// `Springfield` inside it, so places that differ only in their qualifier
/// query different areas. A single-segment place matches the area name
/// directly.
fn build_drive_network_query(
    place: &PlaceQuery,
    query_timeout_seconds: u32,
) -> Result<String, NetworkSourceError> {
    let segments: Vec<&str> = place
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .collect();
    // Broadest qualifier last in the place text, so resolve in reverse.
    let mut names = segments.iter().rev();
    let outermost = names.next().ok_or_else(|| {
        NetworkSourceError::invalid_request("place name has no usable area segment")
    })?;

    let mut query = format!(
        "[out:json][timeout:{query_timeout_seconds}];\n\
         area[\"name\"=\"{}\"]->.searchArea;\n",
        escape_quoted(outermost),
    );
    for name in names {
        query.push_str(&format!(
            "rel(area.searchArea)[\"boundary\"=\"administrative\"][\"name\"=\"{}\"];\n\
             map_to_area->.searchArea;\n",
            escape_quoted(name),
        ));
    }
    query.push_str(&format!(
        "way(area.searchArea)[\"highway\"~\"^({DRIVE_HIGHWAY_CLASSES})$\"];\n\
         out body geom;"
    ));
    Ok(query)
}

fn escape_quoted(raw: &str) -> String {
    raw.replace('\\', r"\\").replace('"', "\\\"")
}

fn map_transport_error(error: reqwest::Error) -> NetworkSourceError {
    if error.is_timeout() {
        NetworkSourceError::timeout(error.to_string())
    } else {
        NetworkSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> NetworkSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::TOO_MANY_REQUESTS => NetworkSourceError::rate_limited(message),
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            NetworkSourceError::timeout(message)
        }
        _ if status.is_client_error() => NetworkSourceError::invalid_request(message),
        _ => NetworkSourceError::transport(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
