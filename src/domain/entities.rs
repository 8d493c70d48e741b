//! Catalog entities as the rest of the crate sees them.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Catalog identifier of a game.
pub type AppId = u64;

/// A game in one user's library.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedGame {
    pub appid: AppId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub playtime_forever: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub img_icon_url: Option<String>,
}

impl OwnedGame {
    pub fn new(appid: AppId, name: impl Into<String>) -> Self {
        Self {
            appid,
            name: name.into(),
            playtime_forever: None,
            img_icon_url: None,
        }
    }
}

/// Every game one identity owns, keyed by app id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserLibrary {
    identity: String,
    games: HashMap<AppId, OwnedGame>,
}

impl UserLibrary {
    pub fn empty(identity: impl Into<String>) -> Self {
        Self {
            identity: identity.into(),
            games: HashMap::new(),
        }
    }

    /// Build a library, keeping the last entry when an app id repeats.
    pub fn from_games(
        identity: impl Into<String>,
        games: impl IntoIterator<Item = OwnedGame>,
    ) -> Self {
        Self {
            identity: identity.into(),
            games: games.into_iter().map(|game| (game.appid, game)).collect(),
        }
    }

    pub fn identity(&self) -> &str {
        &self.identity
    }

    pub fn contains(&self, appid: AppId) -> bool {
        self.games.contains_key(&appid)
    }

    pub fn get(&self, appid: AppId) -> Option<&OwnedGame> {
        self.games.get(&appid)
    }

    pub fn games(&self) -> impl Iterator<Item = &OwnedGame> {
        self.games.values()
    }

    pub fn len(&self) -> usize {
        self.games.len()
    }

    pub fn is_empty(&self) -> bool {
        self.games.is_empty()
    }
}

impl AsRef<UserLibrary> for UserLibrary {
    fn as_ref(&self) -> &UserLibrary {
        self
    }
}

/// A game owned by at least one member of the queried group.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SharedGame {
    pub appid: AppId,
    pub name: String,
    pub owner_count: usize,
    pub owned_by: Vec<String>,
}

/// Store metadata for a single game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameDetails {
    pub appid: AppId,
    pub name: String,
    pub short_description: String,
    pub header_image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    pub categories: Vec<String>,
    pub genres: Vec<String>,
}

/// Public profile of a catalog user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSummary {
    pub steamid: String,
    pub personaname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realname: Option<String>,
    pub profileurl: String,
    pub avatarfull: String,
}
