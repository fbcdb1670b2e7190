//! Overpass adapter for the external map-data source port.

mod dto;
mod http_source;

pub use http_source::{OverpassHttpIdentity, OverpassHttpSource};
