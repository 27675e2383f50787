//! # NM-Compute: Local Proof-of-Work
//!
//! CPU search for work values that satisfy a block's difficulty threshold.
//! Used when the RPC node does not offer `work_generate`, or as a fallback
//! when it fails.
//!
//! ## Why a separate crate
//!
//! Work search is CPU-bound and takes seconds. The search itself is
//! synchronous (`ComputeEngine::find_work`) and runs on the rayon pool; the
//! async entry point (`tasks::WorkTask`) moves each batch onto
//! `spawn_blocking` so the tokio workers stay free to serve other requests,
//! and checks a cancellation flag between and during batches.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nm_compute::{auto_detect, tasks::WorkTask};
//!
//! let engine = auto_detect()?;
//! let work = WorkTask::new(root, BlockKind::Receive.difficulty_threshold())
//!     .execute(engine, cancel_flag)
//!     .await?;
//! ```

pub mod backends;
pub mod tasks;

use shared_types::{BlockHash, WorkToken};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use thiserror::Error;

/// Compute backend capabilities
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// CPU with Rayon parallelism
    Cpu,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Backend::Cpu => write!(f, "CPU (Rayon)"),
        }
    }
}

/// Compute engine errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComputeError {
    #[error("No compute backend available")]
    NoBackendAvailable,

    #[error("Compute task failed: {0}")]
    TaskFailed(String),

    #[error("Work search cancelled after {attempts} attempts")]
    Cancelled { attempts: u64 },

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Device information
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub name: String,
    pub backend: Backend,
    pub compute_units: u32,
}

/// Compute engine trait - implemented by all backends.
///
/// `find_work` blocks the calling thread; call it from `spawn_blocking` or
/// use [`tasks::WorkTask`].
pub trait ComputeEngine: Send + Sync {
    /// Get backend type
    fn backend(&self) -> Backend;

    /// Get device info
    fn device_info(&self) -> &DeviceInfo;

    /// Search `count` nonces starting at `start` (wrapping) for work on
    /// `root` with difficulty >= `threshold`. Returns early with `Ok(None)`
    /// when `cancel` is raised.
    fn find_work(
        &self,
        root: &BlockHash,
        threshold: u64,
        start: u64,
        count: u64,
        cancel: &AtomicBool,
    ) -> Result<Option<WorkToken>, ComputeError>;
}

/// Auto-detect and create the best available compute engine
pub fn auto_detect() -> Result<Arc<dyn ComputeEngine>, ComputeError> {
    #[cfg(feature = "cpu")]
    {
        let engine = backends::cpu::CpuEngine::new();
        tracing::info!(
            subsystem = "compute",
            "Using CPU work generation: {} cores (Rayon)",
            engine.device_info().compute_units
        );
        Ok(Arc::new(engine))
    }

    #[cfg(not(feature = "cpu"))]
    {
        Err(ComputeError::NoBackendAvailable)
    }
}

/// Create a specific backend
pub fn create_backend(backend: Backend) -> Result<Arc<dyn ComputeEngine>, ComputeError> {
    match backend {
        Backend::Cpu => {
            #[cfg(feature = "cpu")]
            {
                Ok(Arc::new(backends::cpu::CpuEngine::new()))
            }
            #[cfg(not(feature = "cpu"))]
            {
                Err(ComputeError::NoBackendAvailable)
            }
        }
    }
}
