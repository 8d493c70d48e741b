use std::fmt;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::config::RateLimitSettings;
use crate::util::clock::{Clock, system_clock};

#[derive(Debug, Clone, Copy)]
struct Bucket {
    tokens: u32,
    last_refill: Instant,
}

/// Per-identity token bucket refilled lazily on each check.
///
/// A full bucket's worth of tokens is granted for every whole refill interval
/// that elapsed; the remainder of a partial interval is dropped.
pub struct TokenBucketLimiter {
    capacity: u32,
    refill_interval: Duration,
    buckets: DashMap<String, Bucket>,
    clock: Arc<dyn Clock>,
}

impl TokenBucketLimiter {
    pub fn new(capacity: NonZeroU32, refill_interval: Duration) -> Self {
        Self::with_clock(capacity, refill_interval, system_clock())
    }

    pub fn with_clock(
        capacity: NonZeroU32,
        refill_interval: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            capacity: capacity.get(),
            // A zero interval would refill on every call.
            refill_interval: refill_interval.max(Duration::from_millis(1)),
            buckets: DashMap::new(),
            clock,
        }
    }

    pub fn from_settings(settings: &RateLimitSettings, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock(settings.capacity, settings.refill_interval, clock)
    }

    /// Consume one token for `identity`, returning whether the call is admitted.
    pub fn allow(&self, identity: &str) -> bool {
        let now = self.clock.now();

        match self.buckets.entry(identity.to_string()) {
            Entry::Vacant(slot) => {
                slot.insert(Bucket {
                    tokens: self.capacity - 1,
                    last_refill: now,
                });
                true
            }
            Entry::Occupied(mut slot) => {
                let bucket = slot.get_mut();
                let elapsed = now.saturating_duration_since(bucket.last_refill);
                let cycles = elapsed.as_nanos() / self.refill_interval.as_nanos();
                if cycles > 0 {
                    let refilled = u128::from(bucket.tokens)
                        .saturating_add(cycles.saturating_mul(u128::from(self.capacity)));
                    bucket.tokens = refilled.min(u128::from(self.capacity)) as u32;
                    bucket.last_refill = now;
                }

                if bucket.tokens > 0 {
                    bucket.tokens -= 1;
                    true
                } else {
                    false
                }
            }
        }
    }

    /// Forget every bucket.
    pub fn clear(&self) {
        self.buckets.clear();
    }

    /// Number of identities seen since the last clear.
    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn refill_interval(&self) -> Duration {
        self.refill_interval
    }

    /// Seconds until a rejected caller is guaranteed a fresh bucket.
    pub fn retry_after_secs(&self) -> u64 {
        let millis = self.refill_interval.as_millis();
        u64::try_from(millis.div_ceil(1000)).unwrap_or(u64::MAX).max(1)
    }

    #[cfg(test)]
    fn tokens(&self, identity: &str) -> Option<u32> {
        self.buckets.get(identity).map(|bucket| bucket.tokens)
    }
}

impl fmt::Debug for TokenBucketLimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenBucketLimiter")
            .field("capacity", &self.capacity)
            .field("refill_interval", &self.refill_interval)
            .field("buckets", &self.buckets.len())
            .finish()
    }
}
