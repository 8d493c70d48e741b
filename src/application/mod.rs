//! Application services: aggregation, lookups and their error types.

pub mod caches;
pub mod details;
pub mod error;
pub mod ids;
pub mod library;
pub mod pagination;
pub mod players;
pub mod sources;
