use serde::Serialize;

use crate::application::details::DetailResult;
use crate::application::pagination::PageInfo;
use crate::domain::entities::{OwnedGame, PlayerSummary, SharedGame};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommonGamesResponse {
    pub common_games: Vec<OwnedGame>,
    pub pagination: PageInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AllGamesResponse {
    pub games: Vec<SharedGame>,
    pub pagination: PageInfo,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unavailable: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct AppDetailsResponse {
    pub results: Vec<DetailResult>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnedGamesResponse {
    pub steamid: String,
    pub game_count: usize,
    pub games: Vec<OwnedGame>,
}

#[derive(Debug, Serialize)]
pub struct PlayerSummariesResponse {
    pub players: Vec<PlayerSummary>,
}
