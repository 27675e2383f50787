//! Tool handlers.

pub mod ledger;
pub mod wallet;

pub use ledger::LedgerRpc;
pub use wallet::WalletRpc;

use nm_01_rpc_transport::NodeRpc;
use nm_02_work_cache::WorkCache;
use nm_03_block_orchestrator::BlockOrchestratorApi;
use std::sync::Arc;

/// All tool handlers
pub struct McpHandlers {
    pub ledger: LedgerRpc,
    pub wallet: WalletRpc,
}

impl McpHandlers {
    pub fn new(
        node: Arc<dyn NodeRpc>,
        orchestrator: Arc<dyn BlockOrchestratorApi>,
        cache: Arc<WorkCache>,
    ) -> Self {
        Self {
            ledger: LedgerRpc::new(node),
            wallet: WalletRpc::new(orchestrator, cache),
        }
    }
}
