//! Driven adapters: cache tiers and the external map-data source.

pub mod cache;
pub mod overpass;
