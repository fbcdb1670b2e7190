//! Process-level API surface: health probes.

pub mod health;
