//! Work generation task abstraction

use crate::{ComputeEngine, ComputeError};
use shared_types::{BlockHash, WorkToken};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::debug;

/// Nonces searched per blocking batch.
pub const DEFAULT_BATCH_SIZE: u64 = 1 << 22;

/// Work generation task configuration
#[derive(Debug, Clone)]
pub struct WorkTask {
    /// Previous block hash, or the account key for an open block
    pub root: BlockHash,
    /// Minimum difficulty
    pub threshold: u64,
    /// First nonce to try
    pub start: u64,
    /// Nonces per batch
    pub batch_size: u64,
}

impl WorkTask {
    /// Task with a random starting nonce.
    pub fn new(root: BlockHash, threshold: u64) -> Self {
        Self {
            root,
            threshold,
            start: rand::random(),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_start(mut self, start: u64) -> Self {
        self.start = start;
        self
    }

    pub fn with_batch_size(mut self, batch_size: u64) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Search batch after batch until work is found or `cancel` is raised.
    ///
    /// Each batch runs on the blocking pool. Raising `cancel` (typically from
    /// a timeout) stops the current batch early and returns
    /// `ComputeError::Cancelled`.
    pub async fn execute(
        self,
        engine: Arc<dyn ComputeEngine>,
        cancel: Arc<AtomicBool>,
    ) -> Result<WorkToken, ComputeError> {
        let mut next = self.start;
        let mut attempts: u64 = 0;

        loop {
            if cancel.load(Ordering::Relaxed) {
                return Err(ComputeError::Cancelled { attempts });
            }

            let engine = Arc::clone(&engine);
            let flag = Arc::clone(&cancel);
            let (root, threshold, start, count) = (self.root, self.threshold, next, self.batch_size);

            let found = tokio::task::spawn_blocking(move || {
                engine.find_work(&root, threshold, start, count, &flag)
            })
            .await
            .map_err(|e| ComputeError::TaskFailed(e.to_string()))??;

            attempts = attempts.saturating_add(count);
            if let Some(work) = found {
                debug!(
                    subsystem = "compute",
                    root = %self.root,
                    work = %work,
                    attempts,
                    "Local work found"
                );
                return Ok(work);
            }
            next = next.wrapping_add(count);
        }
    }
}
