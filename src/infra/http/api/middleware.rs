use std::net::SocketAddr;

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::{HeaderMap, Request};
use axum::middleware::Next;
use axum::response::Response;
use metrics::counter;
use tracing::warn;

use super::error::ApiError;
use super::state::ApiState;

const FORWARDED_FOR: &str = "x-forwarded-for";
const METRIC_RATE_LIMIT_REJECTED_TOTAL: &str = "gknight_rate_limit_rejected_total";

pub async fn api_rate_limit(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let identity = client_identity(request.headers(), peer);

    if !state.rate_limiter.allow(&identity) {
        counter!(METRIC_RATE_LIMIT_REJECTED_TOTAL).increment(1);
        warn!(
            target: "gknight::ratelimit",
            client = identity.as_str(),
            path = request.uri().path(),
            "request rejected by rate limiter"
        );
        return ApiError::rate_limited(state.rate_limiter.retry_after_secs());
    }

    next.run(request).await
}

/// First `X-Forwarded-For` entry, else the peer address, else empty.
///
/// The header is trusted as sent; a client that can reach the listener
/// directly can pick its own identity.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    let forwarded = headers
        .get(FORWARDED_FOR)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(forwarded), _) => forwarded.to_string(),
        (None, Some(addr)) => addr.ip().to_string(),
        (None, None) => String::new(),
    }
}
