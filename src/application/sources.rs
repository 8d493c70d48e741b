//! Source traits describing the upstream catalog adapters.
//!
//! The application services only ever talk to the catalog through these
//! traits; `infra::steam` provides the HTTP implementation and tests provide
//! in-memory ones.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{AppId, GameDetails, PlayerSummary, UserLibrary};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("catalog request failed: {0}")]
    Transport(String),
    #[error("catalog responded with status {status}")]
    Status { status: u16 },
    #[error("catalog payload could not be decoded: {0}")]
    Decode(String),
    #[error("catalog has no data for `{0}`")]
    NoData(String),
}

impl UpstreamError {
    pub fn transport(err: impl std::fmt::Display) -> Self {
        Self::Transport(err.to_string())
    }

    pub fn decode(err: impl std::fmt::Display) -> Self {
        Self::Decode(err.to_string())
    }
}

/// Fetch the library of a single identity.
#[async_trait]
pub trait LibrarySource: Send + Sync {
    /// A well-formed response without a game list yields an empty library.
    async fn owned_games(&self, identity: &str) -> Result<UserLibrary, UpstreamError>;
}

/// Fetch store metadata for a single app.
#[async_trait]
pub trait DetailsSource: Send + Sync {
    async fn app_details(&self, appid: AppId) -> Result<GameDetails, UpstreamError>;
}

/// Fetch public profiles for a batch of identities in one call.
#[async_trait]
pub trait PlayerSource: Send + Sync {
    async fn player_summaries(
        &self,
        identities: &[String],
    ) -> Result<Vec<PlayerSummary>, UpstreamError>;
}
