use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::application::details::DetailsCache;
use crate::application::library::LibraryCache;
use crate::application::players::PlayerCache;
use crate::cache::TtlCache;
use crate::config::CacheSettings;
use crate::util::clock::Clock;

/// One cache per upstream endpoint, all sharing the configured TTL.
///
/// Every slot is `None` when caching is disabled.
#[derive(Debug, Clone, Default)]
pub struct CacheSet {
    pub owned_games: Option<Arc<LibraryCache>>,
    pub app_details: Option<Arc<DetailsCache>>,
    pub player_summaries: Option<Arc<PlayerCache>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSizes {
    pub owned_games: usize,
    pub app_details: usize,
    pub player_summaries: usize,
}

impl CacheSet {
    pub fn from_settings(settings: &CacheSettings, clock: Arc<dyn Clock>) -> Self {
        if !settings.enabled {
            return Self::default();
        }

        Self {
            owned_games: Some(Arc::new(TtlCache::with_clock(
                "owned_games",
                settings.ttl,
                clock.clone(),
            ))),
            app_details: Some(Arc::new(TtlCache::with_clock(
                "app_details",
                settings.ttl,
                clock.clone(),
            ))),
            player_summaries: Some(Arc::new(TtlCache::with_clock(
                "player_summaries",
                settings.ttl,
                clock,
            ))),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.owned_games.is_some()
    }

    /// Shared TTL of the caches, `None` when caching is disabled.
    pub fn ttl(&self) -> Option<Duration> {
        self.owned_games.as_ref().map(|cache| cache.ttl())
    }

    pub fn clear(&self) {
        if let Some(cache) = &self.owned_games {
            cache.clear();
        }
        if let Some(cache) = &self.app_details {
            cache.clear();
        }
        if let Some(cache) = &self.player_summaries {
            cache.clear();
        }
    }

    pub fn sizes(&self) -> CacheSizes {
        CacheSizes {
            owned_games: self.owned_games.as_ref().map_or(0, |c| c.len()),
            app_details: self.app_details.as_ref().map_or(0, |c| c.len()),
            player_summaries: self.player_summaries.as_ref().map_or(0, |c| c.len()),
        }
    }
}
