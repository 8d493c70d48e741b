//! Small, dependency-light helpers shared across layers.

pub mod clock;
pub mod collation;
