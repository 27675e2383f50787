//! Inbound port: the operations exposed to the MCP gateway.

use crate::domain::{
    AccountStatus, InitializeResult, OperationError, ReceiveReport, SendReceipt, WarmResult,
};
use async_trait::async_trait;

/// Account-level operations.
///
/// Addresses, keys and amounts arrive as the agent sent them; every
/// implementation validates them before touching the network.
#[async_trait]
pub trait BlockOrchestratorApi: Send + Sync {
    /// Receive every pending block for `address`, one at a time.
    async fn receive_all_pending(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<ReceiveReport, OperationError>;

    /// Receive pending funds, then send `amount_raw` to `to_address`.
    async fn send_transaction(
        &self,
        from_address: &str,
        to_address: &str,
        amount_raw: &str,
        private_key: &str,
    ) -> Result<SendReceipt, OperationError>;

    /// Balance, frontier and pending summary.
    async fn account_status(&self, address: &str) -> Result<AccountStatus, OperationError>;

    /// Precompute work for the account's next block.
    async fn warm_work(&self, address: &str) -> Result<WarmResult, OperationError>;

    /// Open the account by receiving its pending blocks.
    async fn initialize_account(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<InitializeResult, OperationError>;
}
