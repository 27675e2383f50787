//! Subsystem wiring.
//!
//! ```text
//! RpcTransport ──► WorkGenerator ──► WorkCache ──┐
//!      │                                         ▼
//!      └──────────────────────────────► BlockOrchestrator
//!                                                │
//!                                   McpHandlers ◄┘──► McpGatewayService
//! ```

use crate::config::RuntimeConfig;
use anyhow::{Context, Result};
use nano_telemetry::subsystems;
use nm_01_rpc_transport::{NodeRpc, RpcTransport};
use nm_02_work_cache::{build_generator, sweep_task, WorkCache, WorkGenerator};
use nm_03_block_orchestrator::{BlockOrchestrator, BlockOrchestratorApi};
use nm_04_mcp_gateway::{McpGatewayService, McpHandlers};
use std::future::Future;
use std::sync::Arc;

/// Every long-lived service, built once at startup.
pub struct Services {
    pub node: Arc<dyn NodeRpc>,
    pub cache: Arc<WorkCache>,
    pub orchestrator: Arc<BlockOrchestrator>,
    pub gateway: McpGatewayService,
}

impl Services {
    /// Build against the configured RPC nodes.
    pub fn assemble(config: &RuntimeConfig) -> Result<Self> {
        let transport =
            RpcTransport::new(config.transport.clone()).context("failed to build RPC transport")?;
        let node: Arc<dyn NodeRpc> = Arc::new(transport);
        let generator = build_generator(&config.work, Arc::clone(&node))
            .context("failed to build work generator")?;
        Self::assemble_with(config, node, generator)
    }

    /// Build around an existing node client and work generator.
    pub fn assemble_with(
        config: &RuntimeConfig,
        node: Arc<dyn NodeRpc>,
        generator: Arc<dyn WorkGenerator>,
    ) -> Result<Self> {
        let cache = Arc::new(WorkCache::new(
            config.work_cache.clone(),
            config.work.clone(),
            generator,
        ));

        let orchestrator = Arc::new(
            BlockOrchestrator::new(
                config.orchestrator.clone(),
                Arc::clone(&node),
                Arc::clone(&cache),
            )
            .context("invalid orchestrator configuration")?,
        );

        let handlers = McpHandlers::new(
            Arc::clone(&node),
            Arc::clone(&orchestrator) as Arc<dyn BlockOrchestratorApi>,
            Arc::clone(&cache),
        );
        let gateway = McpGatewayService::new(config.gateway.clone(), handlers)
            .context("invalid gateway configuration")?;

        Ok(Self {
            node,
            cache,
            orchestrator,
            gateway,
        })
    }

    /// Run the sweep task and the gateway until `shutdown` resolves.
    pub async fn run<F>(self, config: &RuntimeConfig, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let sweeper = tokio::spawn(sweep_task(
            Arc::clone(&self.cache),
            config.work_cache.sweep_interval,
        ));

        let served = self.gateway.serve(shutdown).await;
        sweeper.abort();

        let stats = self.cache.stats();
        nano_telemetry::log_event!(
            info,
            subsystems::WORK_CACHE,
            "Work cache final stats",
            hits = stats.hits,
            misses = stats.misses,
            generated = stats.generated
        );

        served.context("gateway stopped with an error")
    }
}
