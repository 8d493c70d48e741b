//! Process-lifetime caching of upstream catalog responses.
//!
//! Each upstream endpoint gets its own [`TtlCache`] with a single TTL:
//!
//! ```toml
//! [cache]
//! enabled = true
//! ttl_ms = 300000
//! ```
//!
//! Entries are evicted lazily on the first read after they expire. There is
//! no capacity bound and no background sweeper; `clear` is the operator
//! reset.

mod keys;
mod ttl;

pub use keys::CacheKey;
pub use ttl::{DEFAULT_TTL, TtlCache};

pub(crate) const METRIC_CACHE_HIT_TOTAL: &str = "gknight_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS_TOTAL: &str = "gknight_cache_miss_total";
pub(crate) const METRIC_CACHE_EXPIRED_TOTAL: &str = "gknight_cache_expired_total";
