use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Serialize;
use tracing::info;

use crate::application::caches::{CacheSet, CacheSizes};

use super::api::rate_limit::TokenBucketLimiter;
use super::middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct AdminState {
    pub caches: CacheSet,
    pub rate_limiter: Arc<TokenBucketLimiter>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache_enabled: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_ttl_ms: Option<u128>,
    pub caches: CacheSizes,
    pub rate_limit: RateLimitStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub buckets: usize,
    pub capacity: u32,
    pub refill_interval_ms: u128,
}

/// Operator listener; bind it to a private address.
pub fn build_admin_router(state: AdminState) -> Router {
    Router::new()
        .route("/_health", get(|| async { StatusCode::NO_CONTENT }))
        .route("/stats", get(stats))
        .route("/cache/clear", post(clear_caches))
        .route("/rate-limit/clear", post(clear_rate_limits))
        .with_state(state)
        .layer(middleware::from_fn(log_responses))
        .layer(middleware::from_fn(set_request_context))
}

async fn stats(State(state): State<AdminState>) -> Json<StatsResponse> {
    Json(StatsResponse {
        cache_enabled: state.caches.is_enabled(),
        cache_ttl_ms: state.caches.ttl().map(|ttl| ttl.as_millis()),
        caches: state.caches.sizes(),
        rate_limit: RateLimitStats {
            buckets: state.rate_limiter.len(),
            capacity: state.rate_limiter.capacity(),
            refill_interval_ms: state.rate_limiter.refill_interval().as_millis(),
        },
    })
}

async fn clear_caches(State(state): State<AdminState>) -> Response {
    let before = state.caches.sizes();
    state.caches.clear();
    info!(
        target: "gknight::admin",
        owned_games = before.owned_games,
        app_details = before.app_details,
        player_summaries = before.player_summaries,
        "caches cleared"
    );
    StatusCode::NO_CONTENT.into_response()
}

async fn clear_rate_limits(State(state): State<AdminState>) -> Response {
    let buckets = state.rate_limiter.len();
    state.rate_limiter.clear();
    info!(target: "gknight::admin", buckets, "rate limit buckets cleared");
    StatusCode::NO_CONTENT.into_response()
}
