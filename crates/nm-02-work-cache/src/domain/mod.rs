//! Domain layer for the work cache.

pub mod config;
pub mod error;
pub mod stats;
pub mod store;

pub use config::{ConfigError, WorkCacheConfig, WorkSettings, WorkSource};
pub use error::WorkError;
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{CacheStore, ConsumeOutcome, Lookup, Timestamp, WorkEntry, WorkKey};
