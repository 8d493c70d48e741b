//! Group library aggregation: which games does everybody own?
//!
//! Libraries are fetched concurrently (through the cache when one is
//! configured), intersected by app id, sorted by name and paginated. The
//! result depends only on the fetched data, never on the order in which the
//! fetches complete.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use futures::future::join_all;
use thiserror::Error;
use tracing::{debug, warn};

use crate::application::pagination::{Page, PageParams, paginate};
use crate::application::sources::{LibrarySource, UpstreamError};
use crate::cache::{CacheKey, TtlCache};
use crate::domain::entities::{AppId, OwnedGame, SharedGame, UserLibrary};
use crate::util::collation::NameCollator;

pub type LibraryCache = TtlCache<CacheKey, Arc<UserLibrary>>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LibraryError {
    #[error("at least one identity is required")]
    NoIdentities,
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

/// Intersect libraries by app id.
///
/// Candidates come from the first library and survive only if every other
/// library holds the same id. No libraries means no common games.
pub fn compute_common<L: AsRef<UserLibrary>>(libraries: &[L]) -> Vec<OwnedGame> {
    let Some((first, rest)) = libraries.split_first() else {
        return Vec::new();
    };

    let mut common: Vec<OwnedGame> = first
        .as_ref()
        .games()
        .filter(|game| rest.iter().all(|other| other.as_ref().contains(game.appid)))
        .cloned()
        .collect();

    sort_games(&mut common);
    common
}

/// Union of all libraries with the identities owning each game.
///
/// Owners are listed in the order their libraries were supplied.
pub fn compute_ownership<L: AsRef<UserLibrary>>(libraries: &[L]) -> Vec<SharedGame> {
    let mut shared: BTreeMap<AppId, SharedGame> = BTreeMap::new();

    for library in libraries {
        let library = library.as_ref();
        for game in library.games() {
            let entry = shared.entry(game.appid).or_insert_with(|| SharedGame {
                appid: game.appid,
                name: game.name.clone(),
                owner_count: 0,
                owned_by: Vec::new(),
            });
            entry.owner_count += 1;
            entry.owned_by.push(library.identity().to_string());
        }
    }

    let collator = NameCollator::new();
    let mut games: Vec<SharedGame> = shared.into_values().collect();
    games.sort_by(|a, b| {
        by_name_then_id(&collator, (a.name.as_str(), a.appid), (b.name.as_str(), b.appid))
    });
    games
}

/// Sort by locale-aware name, falling back to app id so the order is total.
pub fn sort_games(games: &mut [OwnedGame]) {
    let collator = NameCollator::new();
    games.sort_by(|a, b| {
        by_name_then_id(&collator, (a.name.as_str(), a.appid), (b.name.as_str(), b.appid))
    });
}

fn by_name_then_id(
    collator: &NameCollator,
    (left, left_id): (&str, AppId),
    (right, right_id): (&str, AppId),
) -> Ordering {
    collator.compare(left, right).then_with(|| left_id.cmp(&right_id))
}

/// Outcome of fetching every requested library.
#[derive(Debug, Clone, Default)]
pub struct FetchedLibraries {
    /// One library per distinct identity, in request order.
    pub libraries: Vec<Arc<UserLibrary>>,
    /// Identities whose fetch failed; their library is present but empty.
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommonGames {
    pub page: Page<OwnedGame>,
    pub unavailable: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipOverview {
    pub page: Page<SharedGame>,
    pub unavailable: Vec<String>,
}

#[derive(Clone)]
pub struct LibraryService {
    source: Arc<dyn LibrarySource>,
    cache: Option<Arc<LibraryCache>>,
}

impl LibraryService {
    pub fn new(source: Arc<dyn LibrarySource>, cache: Option<Arc<LibraryCache>>) -> Self {
        Self { source, cache }
    }

    /// Load one library, consulting the cache first. Only successful
    /// responses are cached.
    pub async fn library(&self, identity: &str) -> Result<Arc<UserLibrary>, UpstreamError> {
        let key = CacheKey::owned_games(identity);
        if let Some(cached) = self.cache.as_ref().and_then(|cache| cache.get(&key)) {
            debug!(target: "gknight::library", %key, "serving library from cache");
            return Ok(cached);
        }

        let library = Arc::new(self.source.owned_games(identity).await?);
        if let Some(cache) = self.cache.as_ref() {
            cache.set(key, library.clone());
        }
        Ok(library)
    }

    /// Fetch every distinct, non-blank identity concurrently.
    ///
    /// A failed fetch degrades to an empty library for that identity and is
    /// reported in [`FetchedLibraries::unavailable`].
    pub async fn fetch_all(&self, identities: &[String]) -> FetchedLibraries {
        let mut seen = HashSet::new();
        let distinct: Vec<&str> = identities
            .iter()
            .map(String::as_str)
            .filter(|identity| !identity.trim().is_empty())
            .filter(|identity| seen.insert(*identity))
            .collect();

        let results = join_all(distinct.iter().map(|identity| self.library(identity))).await;

        let mut fetched = FetchedLibraries::default();
        for (identity, result) in distinct.into_iter().zip(results) {
            match result {
                Ok(library) => fetched.libraries.push(library),
                Err(err) => {
                    warn!(
                        target: "gknight::library",
                        identity,
                        error = %err,
                        "library unavailable, treating as empty"
                    );
                    fetched.unavailable.push(identity.to_string());
                    fetched.libraries.push(Arc::new(UserLibrary::empty(identity)));
                }
            }
        }
        fetched
    }

    /// Games owned by every identity, one page at a time.
    pub async fn common_games(
        &self,
        identities: &[String],
        params: PageParams,
    ) -> Result<CommonGames, LibraryError> {
        ensure_identities(identities)?;

        let fetched = self.fetch_all(identities).await;
        let common = compute_common(&fetched.libraries);
        debug!(
            target: "gknight::library",
            users = fetched.libraries.len(),
            common = common.len(),
            "computed common games"
        );

        Ok(CommonGames {
            page: paginate(common, params),
            unavailable: fetched.unavailable,
        })
    }

    /// Every game owned by anyone in the group, with owner lists.
    pub async fn ownership(
        &self,
        identities: &[String],
        params: PageParams,
    ) -> Result<OwnershipOverview, LibraryError> {
        ensure_identities(identities)?;

        let fetched = self.fetch_all(identities).await;
        let games = compute_ownership(&fetched.libraries);

        Ok(OwnershipOverview {
            page: paginate(games, params),
            unavailable: fetched.unavailable,
        })
    }

    /// One identity's library sorted by name. Failures are returned, not
    /// masked, since there is nothing to intersect with.
    pub async fn owned_games(&self, identity: &str) -> Result<Vec<OwnedGame>, LibraryError> {
        if identity.trim().is_empty() {
            return Err(LibraryError::NoIdentities);
        }

        let library = self.library(identity).await?;
        let mut games: Vec<OwnedGame> = library.games().cloned().collect();
        sort_games(&mut games);
        Ok(games)
    }
}

fn ensure_identities(identities: &[String]) -> Result<(), LibraryError> {
    if identities.iter().all(|identity| identity.trim().is_empty()) {
        return Err(LibraryError::NoIdentities);
    }
    Ok(())
}
