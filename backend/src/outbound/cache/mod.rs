//! Cache tier adapters implementing the `GraphCache` port.
//!
//! Two real tiers plus a no-op stand-in:
//! - [`redis::RedisGraphCache`] — the fast shared tier, optional;
//! - [`disk::DiskGraphCache`] — the durable local tier;
//! - [`noop::NoopGraphCache`] — substituted when the fast tier is not
//!   configured, so the orchestrator never branches on tier presence.

pub mod disk;
pub mod noop;
pub mod redis;

pub use disk::DiskGraphCache;
pub use noop::NoopGraphCache;
pub use redis::RedisGraphCache;
