//! CPU compute backend using Rayon
//!
//! Splits the nonce range into one chunk per core. Every worker checks the
//! shared `found` flag and the caller's cancel flag on each iteration, so a
//! hit or a timeout stops all workers within one hash.

use crate::{Backend, ComputeEngine, ComputeError, DeviceInfo};
use rayon::prelude::*;
use shared_crypto::work_difficulty;
use shared_types::{BlockHash, WorkToken};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// CPU-based compute engine using Rayon
pub struct CpuEngine {
    device_info: DeviceInfo,
}

impl CpuEngine {
    pub fn new() -> Self {
        let num_cpus = num_cpus::get().max(1) as u32;

        Self {
            device_info: DeviceInfo {
                name: format!("CPU ({} cores)", num_cpus),
                backend: Backend::Cpu,
                compute_units: num_cpus,
            },
        }
    }
}

impl Default for CpuEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeEngine for CpuEngine {
    fn backend(&self) -> Backend {
        Backend::Cpu
    }

    fn device_info(&self) -> &DeviceInfo {
        &self.device_info
    }

    fn find_work(
        &self,
        root: &BlockHash,
        threshold: u64,
        start: u64,
        count: u64,
        cancel: &AtomicBool,
    ) -> Result<Option<WorkToken>, ComputeError> {
        if count == 0 {
            return Err(ComputeError::InvalidInput("empty nonce range".to_string()));
        }

        let found = AtomicBool::new(false);
        let result = AtomicU64::new(0);

        let num_threads = u64::from(self.device_info.compute_units).min(count);
        let chunk_size = count / num_threads;

        (0..num_threads).into_par_iter().for_each(|thread_id| {
            let offset = thread_id * chunk_size;
            let len = if thread_id == num_threads - 1 {
                count - offset
            } else {
                chunk_size
            };

            for i in 0..len {
                if found.load(Ordering::Relaxed) || cancel.load(Ordering::Relaxed) {
                    break;
                }

                let candidate = WorkToken::new(start.wrapping_add(offset + i));
                if work_difficulty(root, candidate) >= threshold {
                    // First writer wins; later hits are discarded.
                    if found
                        .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
                        .is_ok()
                    {
                        result.store(candidate.value(), Ordering::SeqCst);
                    }
                    break;
                }
            }
        });

        if found.load(Ordering::SeqCst) {
            Ok(Some(WorkToken::new(result.load(Ordering::SeqCst))))
        } else {
            Ok(None)
        }
    }
}
