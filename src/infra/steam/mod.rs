//! HTTP adapter for the Steam web API and store API.

mod models;

use std::time::Instant;

use async_trait::async_trait;
use metrics::{counter, histogram};
use reqwest::{Client, Url};
use tracing::{debug, warn};

use crate::application::sources::{DetailsSource, LibrarySource, PlayerSource, UpstreamError};
use crate::config::SteamSettings;
use crate::domain::entities::{AppId, GameDetails, PlayerSummary, UserLibrary};
use crate::infra::error::InfraError;

const OWNED_GAMES_PATH: &str = "IPlayerService/GetOwnedGames/v0001/";
const PLAYER_SUMMARIES_PATH: &str = "ISteamUser/GetPlayerSummaries/v0002/";
const APP_DETAILS_PATH: &str = "api/appdetails";

const ENDPOINT_OWNED_GAMES: &str = "owned_games";
const ENDPOINT_PLAYER_SUMMARIES: &str = "player_summaries";
const ENDPOINT_APP_DETAILS: &str = "app_details";

const METRIC_UPSTREAM_FAILURE_TOTAL: &str = "gknight_upstream_failure_total";
const METRIC_UPSTREAM_REQUEST_MS: &str = "gknight_upstream_request_ms";

#[derive(Clone, Debug)]
pub struct SteamClient {
    http: Client,
    api_key: Option<String>,
    api_base: Url,
    store_base: Url,
}

impl SteamClient {
    pub fn new(settings: &SteamSettings) -> Result<Self, InfraError> {
        let http = Client::builder()
            .user_agent(concat!("gknight/", env!("CARGO_PKG_VERSION")))
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| InfraError::http_client(err.to_string()))?;

        Ok(Self {
            http,
            api_key: settings.api_key.clone(),
            api_base: settings.api_base_url.clone(),
            store_base: settings.store_base_url.clone(),
        })
    }

    fn api_url(&self, path: &str, query: &[(&str, &str)]) -> Result<Url, UpstreamError> {
        let mut url = self.api_base.join(path).map_err(UpstreamError::transport)?;
        {
            let mut pairs = url.query_pairs_mut();
            if let Some(key) = self.api_key.as_deref() {
                pairs.append_pair("key", key);
            }
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
        }
        Ok(url)
    }

    fn store_url(&self, appid: AppId) -> Result<Url, UpstreamError> {
        let mut url = self
            .store_base
            .join(APP_DETAILS_PATH)
            .map_err(UpstreamError::transport)?;
        url.query_pairs_mut()
            .append_pair("appids", &appid.to_string());
        Ok(url)
    }

    /// Issue a GET and return the body of a 2xx response.
    async fn fetch(&self, endpoint: &'static str, url: Url) -> Result<Vec<u8>, UpstreamError> {
        let started = Instant::now();
        let result = self.send(url).await;
        histogram!(METRIC_UPSTREAM_REQUEST_MS, "endpoint" => endpoint)
            .record(started.elapsed().as_secs_f64() * 1000.0);

        if let Err(err) = &result {
            counter!(METRIC_UPSTREAM_FAILURE_TOTAL, "endpoint" => endpoint).increment(1);
            warn!(target: "gknight::steam", endpoint, error = %err, "catalog request failed");
        }
        result
    }

    async fn send(&self, url: Url) -> Result<Vec<u8>, UpstreamError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(UpstreamError::transport)?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(UpstreamError::transport)?;
        Ok(body.to_vec())
    }
}

#[async_trait]
impl LibrarySource for SteamClient {
    async fn owned_games(&self, identity: &str) -> Result<UserLibrary, UpstreamError> {
        let url = self.api_url(
            OWNED_GAMES_PATH,
            &[
                ("steamid", identity),
                ("format", "json"),
                ("include_appinfo", "1"),
            ],
        )?;
        let body = self.fetch(ENDPOINT_OWNED_GAMES, url).await?;
        let library = models::parse_owned_games(identity, &body)?;
        debug!(
            target: "gknight::steam",
            identity,
            games = library.len(),
            "fetched owned games"
        );
        Ok(library)
    }
}

#[async_trait]
impl DetailsSource for SteamClient {
    async fn app_details(&self, appid: AppId) -> Result<GameDetails, UpstreamError> {
        let url = self.store_url(appid)?;
        let body = self.fetch(ENDPOINT_APP_DETAILS, url).await?;
        models::parse_app_details(appid, &body)
    }
}

#[async_trait]
impl PlayerSource for SteamClient {
    async fn player_summaries(
        &self,
        identities: &[String],
    ) -> Result<Vec<PlayerSummary>, UpstreamError> {
        let joined = identities.join(",");
        let url = self.api_url(PLAYER_SUMMARIES_PATH, &[("steamids", joined.as_str())])?;
        let body = self.fetch(ENDPOINT_PLAYER_SUMMARIES, url).await?;
        models::parse_player_summaries(&body)
    }
}
