//! Work generation errors.

use nm_01_rpc_transport::TransportError;
use nm_compute::ComputeError;
use shared_types::{BlockHash, BlockKind};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkError {
    /// Generation did not finish within the deadline for `kind`.
    #[error("{kind} work generation timed out after {elapsed_ms}ms")]
    Timeout { kind: BlockKind, elapsed_ms: u64 },

    #[error("node work generation failed: {0}")]
    Rpc(#[from] TransportError),

    #[error("local work generation failed: {0}")]
    Compute(#[from] ComputeError),

    /// Work returned by a generator is below the threshold for its root.
    #[error("work for {root} has difficulty {difficulty:016x}, below {threshold:016x}")]
    BelowThreshold {
        root: BlockHash,
        difficulty: u64,
        threshold: u64,
    },
}

impl WorkError {
    /// Timeouts and transient node failures may succeed on a later attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            WorkError::Timeout { .. } | WorkError::BelowThreshold { .. } => true,
            WorkError::Rpc(e) => e.is_transient(),
            WorkError::Compute(ComputeError::Cancelled { .. }) => true,
            WorkError::Compute(_) => false,
        }
    }
}
