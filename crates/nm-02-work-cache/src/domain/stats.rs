//! Cache counters.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Running counters, updated without taking the store lock.
#[derive(Debug, Default)]
pub struct CacheStats {
    pub hits: AtomicU64,
    pub misses: AtomicU64,
    /// Consume calls refused because another consumer held the key.
    pub contended: AtomicU64,
    pub evictions: AtomicU64,
    pub expirations: AtomicU64,
    /// Successful generator calls.
    pub generated: AtomicU64,
    /// Failed or timed-out generator calls.
    pub failures: AtomicU64,
}

impl CacheStats {
    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self, size: usize, in_use: usize, capacity: usize) -> CacheStatsSnapshot {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let lookups = hits + misses;
        CacheStatsSnapshot {
            hits,
            misses,
            contended: self.contended.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            generated: self.generated.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            hit_rate: if lookups == 0 {
                0.0
            } else {
                hits as f64 / lookups as f64
            },
            size,
            in_use,
            capacity,
        }
    }
}

/// Point-in-time view of the cache, as reported by `getWorkCacheStats`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStatsSnapshot {
    pub hits: u64,
    pub misses: u64,
    pub contended: u64,
    pub evictions: u64,
    pub expirations: u64,
    pub generated: u64,
    pub failures: u64,
    pub hit_rate: f64,
    pub size: usize,
    pub in_use: usize,
    pub capacity: usize,
}
