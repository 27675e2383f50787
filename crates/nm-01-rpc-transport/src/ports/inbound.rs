//! Inbound port: typed node actions.

use crate::domain::{AccountBalance, TransportError};
use async_trait::async_trait;
use shared_types::{
    Account, AccountState, BlockHash, BlockKind, BlockSubtype, PendingBlock, Raw, StateBlock,
    WorkToken,
};

/// The node actions the rest of the system depends on.
///
/// `RpcTransport` is the production implementation; tests substitute an
/// in-memory ledger.
#[async_trait]
pub trait NodeRpc: Send + Sync {
    /// Current frontier, balance and representative. `Ok(None)` for an
    /// account that has never been opened.
    async fn account_info(&self, account: &Account) -> Result<Option<AccountState>, TransportError>;

    /// Up to `count` incoming blocks of at least `threshold` raw.
    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Raw,
    ) -> Result<Vec<PendingBlock>, TransportError>;

    /// Ask the node for work on `root` at the difficulty of `kind`.
    async fn work_generate(&self, root: &BlockHash, kind: BlockKind)
        -> Result<WorkToken, TransportError>;

    /// Publish a signed block. Returns its hash. A timeout is reported, not
    /// repeated on another node.
    async fn process(
        &self,
        block: &StateBlock,
        subtype: BlockSubtype,
    ) -> Result<BlockHash, TransportError>;

    async fn account_balance(&self, account: &Account) -> Result<AccountBalance, TransportError>;
}
