//! Cache key definitions.

use std::fmt;

use crate::domain::entities::AppId;

/// Identifies one upstream request: the endpoint plus what was asked of it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Library of a single identity
    OwnedGames(String),
    /// Store metadata of one app
    AppDetails(AppId),
    /// Profiles for a batch of identities, joined with commas in request order
    PlayerSummaries(String),
}

impl CacheKey {
    pub fn owned_games(identity: &str) -> Self {
        Self::OwnedGames(identity.to_string())
    }

    pub fn app_details(appid: AppId) -> Self {
        Self::AppDetails(appid)
    }

    pub fn player_summaries<S: AsRef<str>>(identities: &[S]) -> Self {
        let joined = identities
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(",");
        Self::PlayerSummaries(joined)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheKey::OwnedGames(identity) => write!(f, "ownedGames:{identity}"),
            CacheKey::AppDetails(appid) => write!(f, "appDetails:{appid}"),
            CacheKey::PlayerSummaries(ids) => write!(f, "playerSummaries:{ids}"),
        }
    }
}
