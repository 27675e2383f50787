//! Cache storage: the entry map and the in-use markers.
//!
//! Pure data structure with the clock passed in. `WorkCache` keeps one
//! `CacheStore` behind a single mutex so that every operation here, and in
//! particular `consume`, is atomic with respect to concurrent callers.

use shared_types::{BlockHash, BlockKind, WorkToken};
use std::collections::HashMap;

/// Milliseconds since the Unix epoch.
pub type Timestamp = u64;

/// Cache key: the work root and the difficulty class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WorkKey {
    pub root: BlockHash,
    pub kind: BlockKind,
}

impl WorkKey {
    pub fn new(root: BlockHash, kind: BlockKind) -> Self {
        Self { root, kind }
    }
}

/// A precomputed work value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkEntry {
    pub work: WorkToken,
    pub created_at: Timestamp,
    pub expires_at: Timestamp,
    /// Insertion order, breaks `created_at` ties for eviction.
    seq: u64,
}

impl WorkEntry {
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now >= self.expires_at
    }
}

/// Result of a non-destructive lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Fresh(WorkToken),
    /// An expired entry was found and removed.
    Expired,
    Absent,
}

/// Result of `CacheStore::consume`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// The caller now holds the key.
    Acquired(WorkToken),
    /// Another consumer holds the key.
    InUse,
    /// An expired entry was found and removed.
    Expired,
    Absent,
}

/// Outcome of `CacheStore::insert`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Inserted {
    pub evicted: Option<WorkKey>,
    pub replaced: bool,
}

#[derive(Debug)]
pub struct CacheStore {
    entries: HashMap<WorkKey, WorkEntry>,
    /// Key -> time it was marked.
    in_use: HashMap<WorkKey, Timestamp>,
    capacity: usize,
    next_seq: u64,
}

impl CacheStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: HashMap::with_capacity(capacity),
            in_use: HashMap::new(),
            capacity: capacity.max(1),
            next_seq: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn in_use_count(&self) -> usize {
        self.in_use.len()
    }

    pub fn is_in_use(&self, key: &WorkKey) -> bool {
        self.in_use.contains_key(key)
    }

    /// Look up without marking; drops the entry if it has expired.
    pub fn lookup(&mut self, key: &WorkKey, now: Timestamp) -> Lookup {
        match self.entries.get(key) {
            None => Lookup::Absent,
            Some(entry) if entry.is_expired(now) => {
                self.entries.remove(key);
                Lookup::Expired
            }
            Some(entry) => Lookup::Fresh(entry.work),
        }
    }

    /// Hand the entry to exactly one consumer.
    ///
    /// The in-use check comes first: while a key is held, every other
    /// consumer misses even if a fresh entry is present.
    pub fn consume(&mut self, key: &WorkKey, now: Timestamp) -> ConsumeOutcome {
        if self.in_use.contains_key(key) {
            return ConsumeOutcome::InUse;
        }
        match self.lookup(key, now) {
            Lookup::Absent => ConsumeOutcome::Absent,
            Lookup::Expired => ConsumeOutcome::Expired,
            Lookup::Fresh(work) => {
                self.in_use.insert(*key, now);
                ConsumeOutcome::Acquired(work)
            }
        }
    }

    /// Insert or overwrite. A new key at capacity evicts the oldest entry.
    pub fn insert(
        &mut self,
        key: WorkKey,
        work: WorkToken,
        now: Timestamp,
        ttl_ms: u64,
    ) -> Inserted {
        let replaced = self.entries.contains_key(&key);
        let mut evicted = None;
        if !replaced && self.entries.len() >= self.capacity {
            evicted = self.oldest_key();
            if let Some(old) = evicted {
                self.entries.remove(&old);
            }
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            WorkEntry {
                work,
                created_at: now,
                expires_at: now.saturating_add(ttl_ms),
                seq,
            },
        );
        Inserted { evicted, replaced }
    }

    /// Remove the entry and the in-use marker. Returns whether either existed.
    pub fn invalidate(&mut self, key: &WorkKey) -> bool {
        let had_entry = self.entries.remove(key).is_some();
        let was_in_use = self.in_use.remove(key).is_some();
        had_entry || was_in_use
    }

    /// Drop expired entries, and in-use markers held for longer than
    /// `marker_ttl_ms` (their holder is gone). Returns `(entries, markers)`.
    pub fn sweep(&mut self, now: Timestamp, marker_ttl_ms: u64) -> (usize, usize) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now));
        let entries = before - self.entries.len();

        let before = self.in_use.len();
        self.in_use
            .retain(|_, marked_at| now.saturating_sub(*marked_at) < marker_ttl_ms);
        let markers = before - self.in_use.len();

        (entries, markers)
    }

    pub fn entry(&self, key: &WorkKey) -> Option<&WorkEntry> {
        self.entries.get(key)
    }

    fn oldest_key(&self) -> Option<WorkKey> {
        self.entries
            .iter()
            .min_by_key(|(_, entry)| (entry.created_at, entry.seq))
            .map(|(key, _)| *key)
    }
}
