//! Infrastructure adapters and runtime bootstrap.

pub mod error;
pub mod http;
pub mod steam;
pub mod telemetry;
