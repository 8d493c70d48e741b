pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod state;

pub use state::ApiState;

use axum::{Router, http::StatusCode, middleware as axum_middleware, routing::get};

use crate::infra::http::middleware::{cors, log_responses, set_request_context};

/// Public listener: catalog queries under `/api`, rate limited per client.
pub fn build_api_router(state: ApiState) -> Router {
    let rate_state = state.clone();

    Router::new()
        .route("/api/commonGames", get(handlers::common_games))
        .route("/api/allGames", get(handlers::all_games))
        .route("/api/appDetails", get(handlers::app_details))
        .route("/api/ownedGames", get(handlers::owned_games))
        .route("/api/playerSummaries", get(handlers::player_summaries))
        .route_layer(axum_middleware::from_fn_with_state(
            rate_state,
            middleware::api_rate_limit,
        ))
        .route("/_health", get(|| async { StatusCode::NO_CONTENT }))
        .with_state(state)
        .layer(axum_middleware::from_fn(cors))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}
