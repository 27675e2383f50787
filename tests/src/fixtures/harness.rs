//! Wires the production services around a [`SimulatedNode`].

use super::node::{FlakyConnector, SimulatedNode};
use nm_01_rpc_transport::{NodeConnector, NodeEndpoint, NodeRpc, RpcTransport, TransportConfig};
use nm_02_work_cache::{
    LocalWorkGenerator, TimeSource, WorkCache, WorkCacheConfig, WorkGenerator, WorkSettings,
};
use nm_03_block_orchestrator::{BlockOrchestrator, OrchestratorConfig};
use nm_compute::backends::cpu::CpuEngine;
use shared_crypto::NanoKeyPair;
use std::sync::Arc;
use std::time::Duration;

/// Send-side threshold of the simulated network; about 1 in 4096 nonces.
pub const SEND_THRESHOLD: u64 = 0xfff0_0000_0000_0000;
/// Receive-side threshold; about 1 in 256 nonces.
pub const RECEIVE_THRESHOLD: u64 = 0xff00_0000_0000_0000;

pub const NODE_A: &str = "http://node-a";
pub const NODE_B: &str = "http://node-b";

pub fn keypair(seed: u8) -> NanoKeyPair {
    NanoKeyPair::from_private_key([seed; 32])
}

/// Two nodes, tiny backoff.
pub fn transport_config() -> TransportConfig {
    TransportConfig {
        nodes: vec![NodeEndpoint::new(NODE_A), NodeEndpoint::new(NODE_B)],
        backoff_base: Duration::from_millis(1),
        backoff_max: Duration::from_millis(4),
        ..Default::default()
    }
}

/// No waiting between reads.
pub fn orchestrator_config() -> OrchestratorConfig {
    OrchestratorConfig {
        settle_delay: Duration::ZERO,
        frontier_refresh_attempts: 5,
        frontier_refresh_delay: Duration::ZERO,
        precompute_next: false,
        ..Default::default()
    }
}

pub fn local_generator() -> Arc<LocalWorkGenerator> {
    Arc::new(LocalWorkGenerator::with_thresholds(
        Arc::new(CpuEngine::new()),
        SEND_THRESHOLD,
        RECEIVE_THRESHOLD,
    ))
}

/// The full receive/send stack over one simulated ledger.
pub struct Harness {
    pub node: SimulatedNode,
    pub rpc: Arc<dyn NodeRpc>,
    pub cache: Arc<WorkCache>,
    pub orchestrator: BlockOrchestrator,
}

impl Harness {
    pub fn new() -> Self {
        Self::builder().build()
    }

    pub fn builder() -> HarnessBuilder {
        HarnessBuilder::default()
    }

    /// Fund `keys`'s account with one pending block of `amount` raw.
    pub fn fund(&self, keys: &NanoKeyPair, amount: u128) {
        self.node.fund(&keys.account(), amount);
    }

    pub fn private_key(keys: &NanoKeyPair) -> String {
        keys.private_key_hex().to_string()
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// Overrides for [`Harness`].
#[derive(Default)]
pub struct HarnessBuilder {
    orchestrator: Option<OrchestratorConfig>,
    cache: Option<WorkCacheConfig>,
    generator: Option<Arc<dyn WorkGenerator>>,
    time: Option<Arc<dyn TimeSource>>,
    connector: Option<Box<dyn FnOnce(SimulatedNode) -> Arc<dyn NodeConnector>>>,
}

impl HarnessBuilder {
    pub fn orchestrator(mut self, config: OrchestratorConfig) -> Self {
        self.orchestrator = Some(config);
        self
    }

    pub fn cache(mut self, config: WorkCacheConfig) -> Self {
        self.cache = Some(config);
        self
    }

    pub fn generator(mut self, generator: Arc<dyn WorkGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    pub fn time(mut self, time: Arc<dyn TimeSource>) -> Self {
        self.time = Some(time);
        self
    }

    /// Route node traffic through a [`FlakyConnector`] built by `wrap`.
    pub fn flaky(mut self, wrap: impl FnOnce(FlakyConnector) -> FlakyConnector + 'static) -> Self {
        self.connector = Some(Box::new(move |node| {
            Arc::new(wrap(FlakyConnector::new(node))) as Arc<dyn NodeConnector>
        }));
        self
    }

    pub fn build(self) -> Harness {
        let node = SimulatedNode::new(SEND_THRESHOLD, RECEIVE_THRESHOLD);
        let connector = match self.connector {
            Some(wrap) => wrap(node.clone()),
            None => Arc::new(node.clone()) as Arc<dyn NodeConnector>,
        };
        let transport = RpcTransport::with_connector(transport_config(), connector)
            .expect("valid transport config");
        let rpc: Arc<dyn NodeRpc> = Arc::new(transport);

        let generator = self
            .generator
            .unwrap_or_else(|| local_generator() as Arc<dyn WorkGenerator>);
        let cache_config = self.cache.unwrap_or_default();
        let settings = WorkSettings::default();
        let cache = Arc::new(match self.time {
            Some(time) => WorkCache::with_time_source(cache_config, settings, generator, time),
            None => WorkCache::new(cache_config, settings, generator),
        });

        let orchestrator = BlockOrchestrator::new(
            self.orchestrator.unwrap_or_else(orchestrator_config),
            Arc::clone(&rpc),
            Arc::clone(&cache),
        )
        .expect("valid orchestrator config");

        Harness {
            node,
            rpc,
            cache,
            orchestrator,
        }
    }
}
