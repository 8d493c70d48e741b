//! Batched store metadata lookups.

use std::sync::Arc;

use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, warn};

use crate::application::sources::{DetailsSource, UpstreamError};
use crate::cache::{CacheKey, TtlCache};
use crate::domain::entities::{AppId, GameDetails};

pub type DetailsCache = TtlCache<CacheKey, Arc<GameDetails>>;

/// Outcome for one requested app id. A failure never aborts its siblings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailResult {
    pub appid: AppId,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<GameDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DetailResult {
    fn found(appid: AppId, details: &GameDetails) -> Self {
        Self {
            appid,
            success: true,
            data: Some(details.clone()),
            error: None,
        }
    }

    fn failed(appid: AppId, err: &UpstreamError) -> Self {
        Self {
            appid,
            success: false,
            data: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Clone)]
pub struct DetailsService {
    source: Arc<dyn DetailsSource>,
    cache: Option<Arc<DetailsCache>>,
}

impl DetailsService {
    pub fn new(source: Arc<dyn DetailsSource>, cache: Option<Arc<DetailsCache>>) -> Self {
        Self { source, cache }
    }

    /// Look up every app id concurrently; results keep the request order.
    pub async fn app_details(&self, appids: &[AppId]) -> Vec<DetailResult> {
        join_all(appids.iter().map(|appid| self.lookup(*appid))).await
    }

    async fn lookup(&self, appid: AppId) -> DetailResult {
        let key = CacheKey::app_details(appid);
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!(target: "gknight::details", appid, "serving details from cache");
            return DetailResult::found(appid, &cached);
        }

        match self.source.app_details(appid).await {
            Ok(details) => {
                let result = DetailResult::found(appid, &details);
                if let Some(cache) = self.cache.as_ref() {
                    cache.set(key, Arc::new(details));
                }
                result
            }
            Err(err) => {
                warn!(target: "gknight::details", appid, error = %err, "app details unavailable");
                DetailResult::failed(appid, &err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use super::*;

    fn details(appid: AppId, name: &str) -> GameDetails {
        GameDetails {
            appid,
            name: name.to_string(),
            short_description: format!("{name} description"),
            header_image: format!("https://cdn.example/{appid}.jpg"),
            website: None,
            categories: vec!["Multi-player".to_string()],
            genres: vec!["Action".to_string()],
        }
    }

    #[derive(Default)]
    struct FakeDetails {
        known: HashMap<AppId, GameDetails>,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl DetailsSource for FakeDetails {
        async fn app_details(&self, appid: AppId) -> Result<GameDetails, UpstreamError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.known
                .get(&appid)
                .cloned()
                .ok_or_else(|| UpstreamError::NoData(appid.to_string()))
        }
    }

    fn source() -> Arc<FakeDetails> {
        let mut known = HashMap::new();
        known.insert(570, details(570, "Dota 2"));
        known.insert(440, details(440, "Team Fortress 2"));
        Arc::new(FakeDetails {
            known,
            calls: AtomicUsize::new(0),
        })
    }

    #[tokio::test]
    async fn failures_are_isolated_per_item() {
        let service = DetailsService::new(source(), None);

        let results = service.app_details(&[570, 1, 440]).await;

        let outline: Vec<(AppId, bool)> = results.iter().map(|r| (r.appid, r.success)).collect();
        assert_eq!(outline, vec![(570, true), (1, false), (440, true)]);
        assert_eq!(results[0].data.as_ref().map(|d| d.name.as_str()), Some("Dota 2"));
        assert!(results[1].data.is_none());
        assert!(results[1].error.is_some());
    }

    #[tokio::test]
    async fn only_successes_are_cached() {
        let source = source();
        let cache = Arc::new(DetailsCache::new("app_details", Duration::from_secs(60)));
        let service = DetailsService::new(source.clone(), Some(cache.clone()));

        service.app_details(&[570, 1]).await;
        service.app_details(&[570, 1]).await;

        // 570 is fetched once, the unknown app twice.
        assert_eq!(source.calls.load(Ordering::SeqCst), 3);
        assert_eq!(cache.len(), 1);
        assert!(cache.has(&CacheKey::app_details(570)));
    }

    #[tokio::test]
    async fn empty_request_yields_no_results() {
        let service = DetailsService::new(source(), None);
        assert!(service.app_details(&[]).await.is_empty());
    }
}
