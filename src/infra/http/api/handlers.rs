use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::application::ids::{parse_appids, parse_identities};
use crate::application::pagination::PageParams;

use super::error::ApiError;
use super::models::*;
use super::state::ApiState;

#[derive(Debug, Default, Deserialize)]
pub struct GroupQuery {
    pub ids: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AppDetailsQuery {
    pub appids: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct OwnedGamesQuery {
    pub steamid: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct PlayerSummariesQuery {
    pub ids: Option<String>,
}

pub async fn common_games(
    State(state): State<ApiState>,
    Query(query): Query<GroupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let identities = parse_identities(query.ids.as_deref(), &state.roster)?;
    let params = page_params(&query)?;

    let result = state.library.common_games(&identities, params).await?;

    Ok(Json(CommonGamesResponse {
        common_games: result.page.items,
        pagination: result.page.info,
        unavailable: result.unavailable,
    }))
}

pub async fn all_games(
    State(state): State<ApiState>,
    Query(query): Query<GroupQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let identities = parse_identities(query.ids.as_deref(), &state.roster)?;
    let params = page_params(&query)?;

    let result = state.library.ownership(&identities, params).await?;

    Ok(Json(AllGamesResponse {
        games: result.page.items,
        pagination: result.page.info,
        unavailable: result.unavailable,
    }))
}

pub async fn app_details(
    State(state): State<ApiState>,
    Query(query): Query<AppDetailsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let appids = parse_appids(query.appids.as_deref())?;

    let results = state.details.app_details(&appids).await;

    Ok(Json(AppDetailsResponse { results }))
}

pub async fn owned_games(
    State(state): State<ApiState>,
    Query(query): Query<OwnedGamesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let steamid = query
        .steamid
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(|value| state.roster.resolve(value))
        .ok_or_else(|| {
            ApiError::bad_request("Invalid request", Some("steamid is required".into()))
        })?;

    let games = state.library.owned_games(&steamid).await?;

    Ok(Json(OwnedGamesResponse {
        steamid,
        game_count: games.len(),
        games,
    }))
}

pub async fn player_summaries(
    State(state): State<ApiState>,
    Query(query): Query<PlayerSummariesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let identities = parse_identities(query.ids.as_deref(), &state.roster)?;

    let players = state.players.player_summaries(&identities).await?;

    Ok(Json(PlayerSummariesResponse {
        players: players.to_vec(),
    }))
}

fn page_params(query: &GroupQuery) -> Result<PageParams, ApiError> {
    let page = parse_number(query.page.as_deref(), "page")?;
    let limit = parse_number(query.limit.as_deref(), "limit")?;
    Ok(PageParams::from_optional(page, limit)?)
}

fn parse_number(raw: Option<&str>, name: &str) -> Result<Option<u32>, ApiError> {
    match raw.map(str::trim).filter(|value| !value.is_empty()) {
        None => Ok(None),
        Some(value) => value.parse::<u32>().map(Some).map_err(|_| {
            ApiError::bad_request(
                "Invalid pagination parameters",
                Some(format!("{name} must be a positive integer, got `{value}`")),
            )
        }),
    }
}
