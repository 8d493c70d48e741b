mod admin;
pub mod api;
mod middleware;

pub use admin::{AdminState, build_admin_router};
pub use api::rate_limit::TokenBucketLimiter;
pub use api::{ApiState, build_api_router};
pub use middleware::REQUEST_ID_HEADER;

use std::sync::Arc;

use crate::application::caches::CacheSet;
use crate::application::details::DetailsService;
use crate::application::library::LibraryService;
use crate::application::players::PlayerService;
use crate::application::sources::{DetailsSource, LibrarySource, PlayerSource};
use crate::config::{CacheSettings, RateLimitSettings};
use crate::domain::roster::Roster;
use crate::util::clock::Clock;

/// Upstream adapters the services are built on.
#[derive(Clone)]
pub struct Sources {
    pub library: Arc<dyn LibrarySource>,
    pub details: Arc<dyn DetailsSource>,
    pub players: Arc<dyn PlayerSource>,
}

impl Sources {
    /// Use one adapter for every endpoint.
    pub fn from_single<S>(source: Arc<S>) -> Self
    where
        S: LibrarySource + DetailsSource + PlayerSource + 'static,
    {
        Self {
            library: source.clone(),
            details: source.clone(),
            players: source,
        }
    }
}

#[derive(Clone)]
pub struct RouterStates {
    pub api: ApiState,
    pub admin: AdminState,
}

/// Wire caches, limiter and services for both listeners. The caches and the
/// limiter are shared so the admin listener can inspect and reset them.
pub fn build_states(
    sources: Sources,
    cache: &CacheSettings,
    rate_limit: &RateLimitSettings,
    roster: Roster,
    clock: Arc<dyn Clock>,
) -> RouterStates {
    let caches = CacheSet::from_settings(cache, clock.clone());
    let rate_limiter = Arc::new(TokenBucketLimiter::from_settings(rate_limit, clock));

    let api = ApiState {
        library: Arc::new(LibraryService::new(
            sources.library,
            caches.owned_games.clone(),
        )),
        details: Arc::new(DetailsService::new(
            sources.details,
            caches.app_details.clone(),
        )),
        players: Arc::new(PlayerService::new(
            sources.players,
            caches.player_summaries.clone(),
        )),
        roster: Arc::new(roster),
        rate_limiter: rate_limiter.clone(),
    };
    let admin = AdminState {
        caches,
        rate_limiter,
    };

    RouterStates { api, admin }
}
