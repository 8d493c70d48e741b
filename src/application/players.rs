use std::sync::Arc;

use tracing::debug;

use crate::application::sources::{PlayerSource, UpstreamError};
use crate::cache::{CacheKey, TtlCache};
use crate::domain::entities::PlayerSummary;

pub type PlayerCache = TtlCache<CacheKey, Arc<Vec<PlayerSummary>>>;

/// Profile lookups for a batch of identities, cached per exact batch.
#[derive(Clone)]
pub struct PlayerService {
    source: Arc<dyn PlayerSource>,
    cache: Option<Arc<PlayerCache>>,
}

impl PlayerService {
    pub fn new(source: Arc<dyn PlayerSource>, cache: Option<Arc<PlayerCache>>) -> Self {
        Self { source, cache }
    }

    pub async fn player_summaries(
        &self,
        identities: &[String],
    ) -> Result<Arc<Vec<PlayerSummary>>, UpstreamError> {
        let key = CacheKey::player_summaries(identities);
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!(target: "gknight::players", %key, "serving summaries from cache");
            return Ok(cached);
        }

        let players = Arc::new(self.source.player_summaries(identities).await?);
        if let Some(cache) = self.cache.as_ref() {
            cache.set(key, players.clone());
        }
        Ok(players)
    }
}
