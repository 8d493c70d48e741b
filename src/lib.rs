//! gknight: find the games every member of a group owns.
//!
//! Libraries are pulled from the Steam web API, intersected, sorted and
//! paginated behind an HTTP API guarded by a per-client token bucket.
//! Upstream responses are memoized in per-endpoint TTL caches.

pub mod application;
pub mod cache;
pub mod config;
pub mod domain;
pub mod infra;
pub mod util;
