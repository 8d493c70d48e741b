//! Key/value store whose entries expire a fixed time after insertion.

use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use metrics::counter;
use tracing::trace;

use crate::util::clock::{Clock, system_clock};

use super::{METRIC_CACHE_EXPIRED_TOTAL, METRIC_CACHE_HIT_TOTAL, METRIC_CACHE_MISS_TOTAL};

/// Default time-to-live: five minutes.
pub const DEFAULT_TTL: Duration = Duration::from_millis(300_000);

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Missing,
}

/// TTL cache shared between concurrent requests.
///
/// Every operation touches a single map shard, so concurrent readers and
/// writers never observe a half-updated entry.
pub struct TtlCache<K, V> {
    name: &'static str,
    ttl: Duration,
    entries: DashMap<K, CacheEntry<V>>,
    clock: Arc<dyn Clock>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + fmt::Display,
    V: Clone,
{
    /// Create a cache backed by the system clock. `name` labels its metrics.
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        Self::with_clock(name, ttl, system_clock())
    }

    pub fn with_clock(name: &'static str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            name,
            ttl,
            entries: DashMap::new(),
            clock,
        }
    }

    /// Store `value`, replacing any previous entry and restarting its TTL.
    pub fn set(&self, key: K, value: V) {
        let expires_at = self.clock.now() + self.ttl;
        self.entries.insert(key, CacheEntry { value, expires_at });
    }

    /// Return the live value for `key`.
    ///
    /// An entry read after its expiry is removed as a side effect.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();

        let lookup = match self.entries.get(key) {
            Some(entry) if now <= entry.expires_at => Lookup::Hit(entry.value.clone()),
            Some(_) => Lookup::Expired,
            None => Lookup::Missing,
        };

        match lookup {
            Lookup::Hit(value) => {
                counter!(METRIC_CACHE_HIT_TOTAL, "cache" => self.name).increment(1);
                trace!(cache = self.name, key = %key, "cache hit");
                Some(value)
            }
            Lookup::Expired => {
                // A concurrent `set` may have refreshed the entry since the read.
                self.entries.remove_if(key, |_, entry| now > entry.expires_at);
                counter!(METRIC_CACHE_EXPIRED_TOTAL, "cache" => self.name).increment(1);
                counter!(METRIC_CACHE_MISS_TOTAL, "cache" => self.name).increment(1);
                trace!(cache = self.name, key = %key, "cache entry expired");
                None
            }
            Lookup::Missing => {
                counter!(METRIC_CACHE_MISS_TOTAL, "cache" => self.name).increment(1);
                None
            }
        }
    }

    pub fn has(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.entries.clear();
    }

    /// Number of stored entries, including expired ones not yet read.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl<K: Eq + Hash, V> fmt::Debug for TtlCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TtlCache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("len", &self.entries.len())
            .finish()
    }
}
