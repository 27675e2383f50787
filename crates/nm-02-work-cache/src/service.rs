//! Work cache service.

use crate::domain::{
    CacheStats, CacheStatsSnapshot, CacheStore, ConsumeOutcome, Lookup, WorkCacheConfig,
    WorkError, WorkKey, WorkSettings,
};
use crate::ports::{SystemTimeSource, TimeSource, WorkGenerator};
use parking_lot::Mutex;
use shared_types::{BlockHash, BlockKind, WorkToken};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Where `obtain` got its work from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkOrigin {
    Cache,
    Generated,
}

/// Work handed to a caller that intends to submit a block with it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObtainedWork {
    pub work: WorkToken,
    pub origin: WorkOrigin,
}

/// Expiring, bounded, single-consumer work cache.
///
/// # Concurrency
///
/// The entry map and the in-use markers sit behind one mutex, so
/// `consume` checks the marker, checks the entry and sets the marker in a
/// single critical section. Generation never runs under the lock.
///
/// # Lifecycle of a key
///
/// ```text
/// precompute ──► cached ──consume──► in use ──invalidate──► gone
///                  │                    ▲
///                  └──ttl/evict──► gone │ consume by anyone else: miss
/// ```
pub struct WorkCache {
    config: WorkCacheConfig,
    settings: WorkSettings,
    store: Mutex<CacheStore>,
    generator: Arc<dyn WorkGenerator>,
    time: Arc<dyn TimeSource>,
    stats: CacheStats,
}

impl WorkCache {
    pub fn new(
        config: WorkCacheConfig,
        settings: WorkSettings,
        generator: Arc<dyn WorkGenerator>,
    ) -> Self {
        Self::with_time_source(config, settings, generator, Arc::new(SystemTimeSource))
    }

    pub fn with_time_source(
        config: WorkCacheConfig,
        settings: WorkSettings,
        generator: Arc<dyn WorkGenerator>,
        time: Arc<dyn TimeSource>,
    ) -> Self {
        let store = Mutex::new(CacheStore::new(config.capacity));
        Self {
            config,
            settings,
            store,
            generator,
            time,
            stats: CacheStats::default(),
        }
    }

    pub fn config(&self) -> &WorkCacheConfig {
        &self.config
    }

    pub fn generator_name(&self) -> &'static str {
        self.generator.name()
    }

    fn ttl_ms(&self) -> u64 {
        self.config.ttl.as_millis() as u64
    }

    /// Generate and cache work for `(root, kind)`.
    ///
    /// Without `force`, a fresh entry is returned as-is and the generator is
    /// not called. Failure is logged and returns `None`; callers fall back to
    /// `obtain`.
    pub async fn precompute(&self, root: BlockHash, kind: BlockKind, force: bool) -> Option<WorkToken> {
        if !self.config.enabled {
            return None;
        }
        let key = WorkKey::new(root, kind);

        if !force {
            let now = self.time.now();
            if let Lookup::Fresh(work) = self.store.lock().lookup(&key, now) {
                debug!(root = %root, kind = %kind, "Work already cached");
                return Some(work);
            }
        }

        let work = match self.generate_bounded(&root, kind).await {
            Ok(work) => work,
            Err(e) => {
                warn!(root = %root, kind = %kind, error = %e, "Work precompute failed");
                return None;
            }
        };

        let now = self.time.now();
        let inserted = self.store.lock().insert(key, work, now, self.ttl_ms());
        if let Some(evicted) = inserted.evicted {
            CacheStats::bump(&self.stats.evictions);
            debug!(root = %evicted.root, kind = %evicted.kind, "Evicted oldest work entry");
        }
        debug!(root = %root, kind = %kind, work = %work, force, "Work cached");
        Some(work)
    }

    /// Cached work for inspection. Never use the result for a submission.
    pub fn peek(&self, root: BlockHash, kind: BlockKind) -> Option<WorkToken> {
        if !self.config.enabled {
            return None;
        }
        let now = self.time.now();
        let lookup = self.store.lock().lookup(&WorkKey::new(root, kind), now);
        match lookup {
            Lookup::Fresh(work) => {
                CacheStats::bump(&self.stats.hits);
                Some(work)
            }
            Lookup::Expired => {
                CacheStats::bump(&self.stats.expirations);
                CacheStats::bump(&self.stats.misses);
                None
            }
            Lookup::Absent => {
                CacheStats::bump(&self.stats.misses);
                None
            }
        }
    }

    /// Take cached work for a submission.
    ///
    /// Returns `None` when the key is held by another consumer, absent or
    /// expired. A `Some` must be followed by exactly one `invalidate` of the
    /// same key.
    pub fn consume(&self, root: BlockHash, kind: BlockKind) -> Option<WorkToken> {
        if !self.config.enabled {
            return None;
        }
        let now = self.time.now();
        let outcome = self.store.lock().consume(&WorkKey::new(root, kind), now);
        match outcome {
            ConsumeOutcome::Acquired(work) => {
                CacheStats::bump(&self.stats.hits);
                debug!(root = %root, kind = %kind, "Work consumed from cache");
                Some(work)
            }
            ConsumeOutcome::InUse => {
                CacheStats::bump(&self.stats.contended);
                CacheStats::bump(&self.stats.misses);
                debug!(root = %root, kind = %kind, "Work in use by another operation");
                None
            }
            ConsumeOutcome::Expired => {
                CacheStats::bump(&self.stats.expirations);
                CacheStats::bump(&self.stats.misses);
                None
            }
            ConsumeOutcome::Absent => {
                CacheStats::bump(&self.stats.misses);
                None
            }
        }
    }

    /// Forget `(root, kind)`: the entry and the in-use marker.
    pub fn invalidate(&self, root: BlockHash, kind: BlockKind) {
        if self.store.lock().invalidate(&WorkKey::new(root, kind)) {
            debug!(root = %root, kind = %kind, "Work invalidated");
        }
    }

    /// Work for a submission: the cached value if it can be consumed,
    /// otherwise freshly generated within the deadline for `kind`.
    ///
    /// Freshly generated work is handed straight to the caller and never
    /// enters the cache.
    pub async fn obtain(&self, root: BlockHash, kind: BlockKind) -> Result<ObtainedWork, WorkError> {
        if let Some(work) = self.consume(root, kind) {
            return Ok(ObtainedWork {
                work,
                origin: WorkOrigin::Cache,
            });
        }
        let work = self.generate_bounded(&root, kind).await?;
        Ok(ObtainedWork {
            work,
            origin: WorkOrigin::Generated,
        })
    }

    async fn generate_bounded(&self, root: &BlockHash, kind: BlockKind) -> Result<WorkToken, WorkError> {
        let deadline = self.settings.timeout_for(kind);
        let started = Instant::now();
        let result = match tokio::time::timeout(deadline, self.generator.generate(root, kind)).await {
            Ok(result) => result,
            Err(_) => Err(WorkError::Timeout {
                kind,
                elapsed_ms: started.elapsed().as_millis() as u64,
            }),
        };
        match &result {
            Ok(_) => CacheStats::bump(&self.stats.generated),
            Err(_) => CacheStats::bump(&self.stats.failures),
        }
        result
    }

    /// Precompute in the background.
    pub fn spawn_precompute(
        self: &Arc<Self>,
        root: BlockHash,
        kind: BlockKind,
    ) -> JoinHandle<Option<WorkToken>> {
        let cache = Arc::clone(self);
        tokio::spawn(async move { cache.precompute(root, kind, false).await })
    }

    /// Drop expired entries and abandoned in-use markers.
    ///
    /// A marker older than the entry TTL belongs to an operation that never
    /// invalidated its key.
    pub fn sweep_expired(&self) -> usize {
        let now = self.time.now();
        let (entries, markers) = self.store.lock().sweep(now, self.ttl_ms());
        CacheStats::add(&self.stats.expirations, entries as u64);
        if markers > 0 {
            warn!(markers, "Released abandoned in-use work markers");
        }
        entries
    }

    pub fn stats(&self) -> CacheStatsSnapshot {
        let (size, in_use) = {
            let store = self.store.lock();
            (store.len(), store.in_use_count())
        };
        self.stats.snapshot(size, in_use, self.config.capacity)
    }
}

/// Background task to sweep expired entries
pub async fn sweep_task(cache: Arc<WorkCache>, interval: Duration) {
    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    info!(interval_ms = interval.as_millis() as u64, "Work cache sweep started");

    loop {
        sweep_interval.tick().await;
        let removed = cache.sweep_expired();
        if removed > 0 {
            debug!(removed, "Swept expired work entries");
        }
    }
}
