//! `WorkGenerator` implementations: node RPC, local CPU, and node with
//! local fallback.

use crate::domain::{WorkError, WorkSettings, WorkSource};
use crate::ports::WorkGenerator;
use async_trait::async_trait;
use nm_01_rpc_transport::NodeRpc;
use nm_compute::tasks::WorkTask;
use nm_compute::ComputeEngine;
use shared_crypto::work_difficulty;
use shared_types::{BlockHash, BlockKind, WorkToken};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Work from the node's `work_generate`.
pub struct NodeWorkGenerator {
    rpc: Arc<dyn NodeRpc>,
    validate: bool,
}

impl NodeWorkGenerator {
    pub fn new(rpc: Arc<dyn NodeRpc>) -> Self {
        Self { rpc, validate: true }
    }

    /// Whether returned work is checked against the threshold.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

#[async_trait]
impl WorkGenerator for NodeWorkGenerator {
    fn name(&self) -> &'static str {
        "node"
    }

    async fn generate(&self, root: &BlockHash, kind: BlockKind) -> Result<WorkToken, WorkError> {
        let work = self.rpc.work_generate(root, kind).await?;
        if self.validate {
            let threshold = kind.difficulty_threshold();
            let difficulty = work_difficulty(root, work);
            if difficulty < threshold {
                return Err(WorkError::BelowThreshold {
                    root: *root,
                    difficulty,
                    threshold,
                });
            }
        }
        debug!(root = %root, kind = %kind, work = %work, "Node generated work");
        Ok(work)
    }
}

/// Raises the cancel flag when the generating future is dropped, so a
/// timed-out search stops burning CPU.
struct CancelOnDrop(Arc<AtomicBool>);

impl Drop for CancelOnDrop {
    fn drop(&mut self) {
        self.0.store(true, Ordering::Relaxed);
    }
}

/// Work from a local compute engine.
pub struct LocalWorkGenerator {
    engine: Arc<dyn ComputeEngine>,
    send_threshold: u64,
    receive_threshold: u64,
}

impl LocalWorkGenerator {
    /// Generator at the protocol thresholds.
    pub fn new(engine: Arc<dyn ComputeEngine>) -> Self {
        Self {
            engine,
            send_threshold: BlockKind::Send.difficulty_threshold(),
            receive_threshold: BlockKind::Receive.difficulty_threshold(),
        }
    }

    /// Generator at custom thresholds, for test networks.
    pub fn with_thresholds(engine: Arc<dyn ComputeEngine>, send: u64, receive: u64) -> Self {
        Self {
            engine,
            send_threshold: send,
            receive_threshold: receive,
        }
    }

    fn threshold(&self, kind: BlockKind) -> u64 {
        match kind {
            BlockKind::Send => self.send_threshold,
            BlockKind::Receive => self.receive_threshold,
        }
    }
}

#[async_trait]
impl WorkGenerator for LocalWorkGenerator {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn generate(&self, root: &BlockHash, kind: BlockKind) -> Result<WorkToken, WorkError> {
        let cancel = Arc::new(AtomicBool::new(false));
        let _guard = CancelOnDrop(Arc::clone(&cancel));
        let work = WorkTask::new(*root, self.threshold(kind))
            .execute(Arc::clone(&self.engine), cancel)
            .await?;
        debug!(root = %root, kind = %kind, work = %work, "Local work generated");
        Ok(work)
    }
}

/// Tries `primary`, then `fallback` when it fails.
pub struct FallbackWorkGenerator {
    primary: Arc<dyn WorkGenerator>,
    fallback: Arc<dyn WorkGenerator>,
}

impl FallbackWorkGenerator {
    pub fn new(primary: Arc<dyn WorkGenerator>, fallback: Arc<dyn WorkGenerator>) -> Self {
        Self { primary, fallback }
    }
}

#[async_trait]
impl WorkGenerator for FallbackWorkGenerator {
    fn name(&self) -> &'static str {
        "node_with_local_fallback"
    }

    async fn generate(&self, root: &BlockHash, kind: BlockKind) -> Result<WorkToken, WorkError> {
        match self.primary.generate(root, kind).await {
            Ok(work) => Ok(work),
            Err(e) => {
                warn!(
                    root = %root,
                    kind = %kind,
                    primary = self.primary.name(),
                    fallback = self.fallback.name(),
                    error = %e,
                    "Work generation failed, falling back"
                );
                self.fallback.generate(root, kind).await
            }
        }
    }
}

/// Build the generator selected by `settings.source`.
pub fn build_generator(
    settings: &WorkSettings,
    rpc: Arc<dyn NodeRpc>,
) -> Result<Arc<dyn WorkGenerator>, WorkError> {
    let node = || -> Arc<dyn WorkGenerator> {
        Arc::new(
            NodeWorkGenerator::new(Arc::clone(&rpc)).with_validation(settings.validate_node_work),
        )
    };

    let generator: Arc<dyn WorkGenerator> = match settings.source {
        WorkSource::Node => node(),
        WorkSource::Local => Arc::new(LocalWorkGenerator::new(nm_compute::auto_detect()?)),
        WorkSource::NodeWithLocalFallback => {
            let local: Arc<dyn WorkGenerator> =
                Arc::new(LocalWorkGenerator::new(nm_compute::auto_detect()?));
            Arc::new(FallbackWorkGenerator::new(node(), local))
        }
    };
    info!(source = generator.name(), "Work generator ready");
    Ok(generator)
}
