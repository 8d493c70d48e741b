use std::collections::{HashMap, HashSet};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{HeaderMap, Method, Request, StatusCode, header},
};
use serde_json::{Value, json};
use tower::ServiceExt;

use gknight::application::sources::{DetailsSource, LibrarySource, PlayerSource, UpstreamError};
use gknight::config::{CacheSettings, RateLimitSettings};
use gknight::domain::entities::{AppId, GameDetails, OwnedGame, PlayerSummary, UserLibrary};
use gknight::domain::roster::Roster;
use gknight::infra::http::{
    REQUEST_ID_HEADER, RouterStates, Sources, build_admin_router, build_api_router, build_states,
};
use gknight::util::clock::ManualClock;

#[derive(Default)]
struct FakeCatalog {
    libraries: HashMap<String, Vec<(AppId, &'static str)>>,
    details: HashMap<AppId, &'static str>,
    failing_users: HashSet<String>,
    players_down: bool,
    library_calls: AtomicUsize,
}

impl FakeCatalog {
    fn user(mut self, identity: &str, games: &[(AppId, &'static str)]) -> Self {
        self.libraries.insert(identity.to_string(), games.to_vec());
        self
    }

    fn failing_user(mut self, identity: &str) -> Self {
        self.failing_users.insert(identity.to_string());
        self
    }

    fn app(mut self, appid: AppId, name: &'static str) -> Self {
        self.details.insert(appid, name);
        self
    }
}

#[async_trait]
impl LibrarySource for FakeCatalog {
    async fn owned_games(&self, identity: &str) -> Result<UserLibrary, UpstreamError> {
        self.library_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing_users.contains(identity) {
            return Err(UpstreamError::Status { status: 500 });
        }
        let games = self.libraries.get(identity).cloned().unwrap_or_default();
        Ok(UserLibrary::from_games(
            identity,
            games
                .into_iter()
                .map(|(appid, name)| OwnedGame::new(appid, name)),
        ))
    }
}

#[async_trait]
impl DetailsSource for FakeCatalog {
    async fn app_details(&self, appid: AppId) -> Result<GameDetails, UpstreamError> {
        let name = self
            .details
            .get(&appid)
            .ok_or_else(|| UpstreamError::NoData(appid.to_string()))?;
        Ok(GameDetails {
            appid,
            name: name.to_string(),
            short_description: String::new(),
            header_image: format!("https://cdn.example/{appid}/header.jpg"),
            website: None,
            categories: vec!["Online Co-op".to_string()],
            genres: vec!["Action".to_string()],
        })
    }
}

#[async_trait]
impl PlayerSource for FakeCatalog {
    async fn player_summaries(
        &self,
        identities: &[String],
    ) -> Result<Vec<PlayerSummary>, UpstreamError> {
        if self.players_down {
            return Err(UpstreamError::transport("connection refused"));
        }
        Ok(identities
            .iter()
            .map(|id| PlayerSummary {
                steamid: id.clone(),
                personaname: format!("player {id}"),
                realname: None,
                profileurl: format!("https://steamcommunity.example/profiles/{id}"),
                avatarfull: String::new(),
            })
            .collect())
    }
}

fn catalog() -> FakeCatalog {
    FakeCatalog::default()
        .user("1", &[(10, "Portal 2"), (20, "Dota 2"), (30, "Among Us")])
        .user("2", &[(10, "Portal 2"), (20, "Dota 2"), (40, "Rust")])
        .app(570, "Dota 2")
}

fn states(catalog: Arc<FakeCatalog>, capacity: u32) -> RouterStates {
    let roster = Roster::from_entries([("Brandon", "1"), ("Rudy", "2")]).expect("roster");
    build_states(
        Sources::from_single(catalog),
        &CacheSettings {
            enabled: true,
            ttl: Duration::from_secs(300),
        },
        &RateLimitSettings {
            capacity: NonZeroU32::new(capacity).expect("capacity"),
            refill_interval: Duration::from_secs(10),
        },
        roster,
        Arc::new(ManualClock::new()),
    )
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, HeaderMap, Value) {
    let response = router
        .clone()
        .oneshot(request)
        .await
        .expect("router responds");
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("json body")
    };
    (status, headers, body)
}

async fn get(router: &Router, uri: &str) -> (StatusCode, HeaderMap, Value) {
    send(
        router,
        Request::builder()
            .uri(uri)
            .body(Body::empty())
            .expect("request"),
    )
    .await
}

async fn post(router: &Router, uri: &str) -> StatusCode {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .body(Body::empty())
        .expect("request");
    send(router, request).await.0
}

#[tokio::test]
async fn common_games_returns_sorted_page() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, headers, body) = get(&router, "/api/commonGames?ids=brandon,2&limit=1&page=2").await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(REQUEST_ID_HEADER));
    assert_eq!(
        body,
        json!({
            "commonGames": [{"appid": 10, "name": "Portal 2"}],
            "pagination": {"page": 2, "limit": 1, "total": 2, "pages": 2}
        })
    );
}

#[tokio::test]
async fn failed_user_is_reported_as_unavailable() {
    let catalog = catalog().failing_user("3");
    let router = build_api_router(states(Arc::new(catalog), 10).api);

    let (status, _, body) = get(&router, "/api/commonGames?ids=1,3").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["commonGames"], json!([]));
    assert_eq!(body["pagination"]["total"], 0);
    assert_eq!(body["pagination"]["pages"], 0);
    assert_eq!(body["unavailable"], json!(["3"]));
}

#[tokio::test]
async fn all_games_lists_owner_counts() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, _, body) = get(&router, "/api/allGames?ids=1,2").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["total"], 4);
    assert_eq!(
        body["games"][0],
        json!({"appid": 30, "name": "Among Us", "ownerCount": 1, "ownedBy": ["1"]})
    );
    assert_eq!(
        body["games"][1],
        json!({"appid": 20, "name": "Dota 2", "ownerCount": 2, "ownedBy": ["1", "2"]})
    );
}

#[tokio::test]
async fn invalid_input_is_rejected_before_fetching() {
    let catalog = Arc::new(catalog());
    let router = build_api_router(states(catalog.clone(), 10).api);

    let (status, _, body) = get(&router, "/api/commonGames").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "bad_request");

    let (status, _, body) = get(&router, "/api/commonGames?ids=1,2&limit=500").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_pagination");

    let (status, _, _) = get(&router, "/api/commonGames?ids=1&page=0").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    assert_eq!(catalog.library_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn repeated_queries_are_served_from_cache() {
    let catalog = Arc::new(catalog());
    let router = build_api_router(states(catalog.clone(), 10).api);

    get(&router, "/api/commonGames?ids=1,2").await;
    get(&router, "/api/commonGames?ids=2,1").await;
    get(&router, "/api/ownedGames?steamid=1").await;

    assert_eq!(catalog.library_calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn app_details_isolates_failures() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, _, body) = get(&router, "/api/appDetails?appids=570,1").await;

    assert_eq!(status, StatusCode::OK);
    let results = body["results"].as_array().expect("results array");
    assert_eq!(results.len(), 2);
    assert_eq!(results[0]["appid"], 570);
    assert_eq!(results[0]["success"], true);
    assert_eq!(results[0]["data"]["name"], "Dota 2");
    assert_eq!(results[0]["data"]["genres"], json!(["Action"]));
    assert_eq!(results[1]["appid"], 1);
    assert_eq!(results[1]["success"], false);
    assert!(results[1].get("data").is_none());
}

#[tokio::test]
async fn app_details_rejects_non_numeric_ids() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, _, _) = get(&router, "/api/appDetails?appids=dota").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn owned_games_resolves_roster_names() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, _, body) = get(&router, "/api/ownedGames?steamid=Rudy").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["steamid"], "2");
    assert_eq!(body["gameCount"], 3);
    assert_eq!(body["games"][0]["name"], "Dota 2");
}

#[tokio::test]
async fn player_summary_outage_is_a_bad_gateway() {
    let catalog = FakeCatalog {
        players_down: true,
        ..catalog()
    };
    let router = build_api_router(states(Arc::new(catalog), 10).api);

    let (status, _, body) = get(&router, "/api/playerSummaries?ids=1,2").await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["error"]["code"], "upstream");
}

#[tokio::test]
async fn player_summaries_are_returned_in_request_order() {
    let router = build_api_router(states(Arc::new(catalog()), 10).api);

    let (status, _, body) = get(&router, "/api/playerSummaries?ids=rudy,brandon").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["players"][0]["steamid"], "2");
    assert_eq!(body["players"][1]["steamid"], "1");
}

#[tokio::test]
async fn rate_limit_rejects_after_capacity() {
    let router = build_api_router(states(Arc::new(catalog()), 2).api);

    for _ in 0..2 {
        let (status, _, _) = get(&router, "/api/ownedGames?steamid=1").await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, headers, body) = get(&router, "/api/ownedGames?steamid=1").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(
        headers
            .get(header::RETRY_AFTER)
            .and_then(|v| v.to_str().ok()),
        Some("10")
    );
    assert_eq!(body["error"]["code"], "rate_limited");

    // Health checks are never limited.
    let (status, _, _) = get(&router, "/_health").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    // Another forwarded client has its own bucket.
    let request = Request::builder()
        .uri("/api/ownedGames?steamid=1")
        .header("x-forwarded-for", "203.0.113.5, 10.0.0.1")
        .body(Body::empty())
        .expect("request");
    let (status, _, _) = send(&router, request).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn preflight_is_answered_with_cors_headers() {
    let router = build_api_router(states(Arc::new(catalog()), 1).api);

    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/commonGames")
        .body(Body::empty())
        .expect("request");
    let (status, headers, _) = send(&router, request).await;

    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .and_then(|v| v.to_str().ok()),
        Some("*")
    );
    assert_eq!(
        headers
            .get(header::ACCESS_CONTROL_ALLOW_METHODS)
            .and_then(|v| v.to_str().ok()),
        Some("GET, POST, OPTIONS")
    );

    // Preflights do not consume tokens.
    let (status, headers, _) = get(&router, "/api/ownedGames?steamid=1").await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
}

#[tokio::test]
async fn admin_reports_and_resets_shared_state() {
    let states = states(Arc::new(catalog()), 1);
    let api = build_api_router(states.api.clone());
    let admin = build_admin_router(states.admin.clone());

    let (status, _, _) = get(&api, "/api/commonGames?ids=1,2").await;
    assert_eq!(status, StatusCode::OK);
    let (status, _, _) = get(&api, "/api/commonGames?ids=1,2").await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

    let (status, _, stats) = get(&admin, "/stats").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["cacheEnabled"], true);
    assert_eq!(stats["cacheTtlMs"], 300_000);
    assert_eq!(stats["caches"]["ownedGames"], 2);
    assert_eq!(stats["rateLimit"]["buckets"], 1);
    assert_eq!(stats["rateLimit"]["capacity"], 1);

    assert_eq!(post(&admin, "/cache/clear").await, StatusCode::NO_CONTENT);
    assert_eq!(post(&admin, "/rate-limit/clear").await, StatusCode::NO_CONTENT);

    let (_, _, stats) = get(&admin, "/stats").await;
    assert_eq!(stats["caches"]["ownedGames"], 0);
    assert_eq!(stats["rateLimit"]["buckets"], 0);

    let (status, _, _) = get(&api, "/api/commonGames?ids=1,2").await;
    assert_eq!(status, StatusCode::OK);
}
