//! Wire payloads of the catalog endpoints and their conversion into entities.

use std::collections::HashMap;

use serde::Deserialize;

use crate::application::sources::UpstreamError;
use crate::domain::entities::{AppId, GameDetails, OwnedGame, PlayerSummary, UserLibrary};

#[derive(Debug, Deserialize)]
struct OwnedGamesEnvelope {
    #[serde(default)]
    response: OwnedGamesBody,
}

#[derive(Debug, Default, Deserialize)]
struct OwnedGamesBody {
    #[serde(default)]
    games: Vec<WireOwnedGame>,
}

#[derive(Debug, Deserialize)]
struct WireOwnedGame {
    appid: AppId,
    #[serde(default)]
    name: String,
    #[serde(default)]
    playtime_forever: Option<u64>,
    #[serde(default)]
    img_icon_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesEnvelope {
    response: PlayerSummariesBody,
}

#[derive(Debug, Deserialize)]
struct PlayerSummariesBody {
    #[serde(default)]
    players: Vec<WirePlayer>,
}

#[derive(Debug, Deserialize)]
struct WirePlayer {
    steamid: String,
    #[serde(default)]
    personaname: String,
    #[serde(default)]
    realname: Option<String>,
    #[serde(default)]
    profileurl: String,
    #[serde(default)]
    avatarfull: String,
}

#[derive(Debug, Deserialize)]
struct AppDetailsEntry {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Option<WireAppData>,
}

#[derive(Debug, Deserialize)]
struct WireAppData {
    #[serde(default)]
    steam_appid: Option<AppId>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    short_description: String,
    #[serde(default)]
    header_image: String,
    #[serde(default)]
    website: Option<String>,
    #[serde(default)]
    categories: Vec<Described>,
    #[serde(default)]
    genres: Vec<Described>,
}

#[derive(Debug, Deserialize)]
struct Described {
    description: String,
}

/// A response without a game list (private profile) is an empty library.
pub(crate) fn parse_owned_games(identity: &str, body: &[u8]) -> Result<UserLibrary, UpstreamError> {
    let envelope: OwnedGamesEnvelope = serde_json::from_slice(body).map_err(UpstreamError::decode)?;

    let games = envelope.response.games.into_iter().map(|game| OwnedGame {
        appid: game.appid,
        name: game.name,
        playtime_forever: game.playtime_forever,
        img_icon_url: game.img_icon_url.filter(|url| !url.is_empty()),
    });
    Ok(UserLibrary::from_games(identity, games))
}

pub(crate) fn parse_player_summaries(body: &[u8]) -> Result<Vec<PlayerSummary>, UpstreamError> {
    let envelope: PlayerSummariesEnvelope =
        serde_json::from_slice(body).map_err(UpstreamError::decode)?;

    Ok(envelope
        .response
        .players
        .into_iter()
        .map(|player| PlayerSummary {
            steamid: player.steamid,
            personaname: player.personaname,
            realname: player.realname.filter(|name| !name.is_empty()),
            profileurl: player.profileurl,
            avatarfull: player.avatarfull,
        })
        .collect())
}

/// The store keys its payload by the requested id. `success: false` or a
/// missing `data` object means the store has nothing for that app.
pub(crate) fn parse_app_details(appid: AppId, body: &[u8]) -> Result<GameDetails, UpstreamError> {
    let mut payload: HashMap<String, AppDetailsEntry> =
        serde_json::from_slice(body).map_err(UpstreamError::decode)?;

    let entry = payload
        .remove(&appid.to_string())
        .ok_or_else(|| UpstreamError::NoData(appid.to_string()))?;
    let data = match entry {
        AppDetailsEntry {
            success: true,
            data: Some(data),
        } => data,
        _ => return Err(UpstreamError::NoData(appid.to_string())),
    };

    Ok(GameDetails {
        appid: data.steam_appid.unwrap_or(appid),
        name: data.name,
        short_description: data.short_description,
        header_image: data.header_image,
        website: data.website.filter(|site| !site.is_empty()),
        categories: data.categories.into_iter().map(|c| c.description).collect(),
        genres: data.genres.into_iter().map(|g| g.description).collect(),
    })
}
