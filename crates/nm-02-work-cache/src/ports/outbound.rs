//! Outbound ports for the work cache.

use crate::domain::{Timestamp, WorkError};
use async_trait::async_trait;
use shared_types::{BlockHash, BlockKind, WorkToken};

/// Produces work for a root at the difficulty of a block kind.
///
/// Implementations may take seconds. The cache bounds every call with the
/// deadline for `kind`; a generator is cancelled by dropping its future.
#[async_trait]
pub trait WorkGenerator: Send + Sync {
    /// Short label for logs and health output.
    fn name(&self) -> &'static str;

    async fn generate(&self, root: &BlockHash, kind: BlockKind) -> Result<WorkToken, WorkError>;
}

/// Time source trait for testability
pub trait TimeSource: Send + Sync {
    /// Milliseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

/// System time implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemTimeSource;

impl TimeSource for SystemTimeSource {
    fn now(&self) -> Timestamp {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as Timestamp)
            .unwrap_or(0)
    }
}

/// Mock time source for testing.
#[cfg(test)]
pub struct MockTimeSource {
    time: std::sync::atomic::AtomicU64,
}

#[cfg(test)]
impl MockTimeSource {
    pub fn new(initial: Timestamp) -> Self {
        Self {
            time: std::sync::atomic::AtomicU64::new(initial),
        }
    }

    pub fn advance(&self, ms: u64) {
        self.time.fetch_add(ms, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
impl TimeSource for MockTimeSource {
    fn now(&self) -> Timestamp {
        self.time.load(std::sync::atomic::Ordering::SeqCst)
    }
}
