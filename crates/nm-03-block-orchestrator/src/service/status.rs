//! Account inspection, work warming and account opening.

use super::{authorize, parse_account, BlockOrchestrator};
use crate::domain::{AccountStatus, InitializeResult, OperationError, WarmResult};
use nano_telemetry::subsystems;
use shared_types::{BlockHash, BlockKind, Raw};

impl BlockOrchestrator {
    pub async fn account_status(&self, address: &str) -> Result<AccountStatus, OperationError> {
        let account = parse_account("address", address)?;
        let state = self.rpc.account_info(&account).await?;
        let pending = self
            .rpc
            .pending(
                &account,
                self.config.pending_count,
                self.config.pending_threshold,
            )
            .await?;

        let pending_total = pending.iter().fold(Raw::ZERO, |sum, block| {
            sum.checked_add(block.amount).unwrap_or(sum)
        });
        let work_ready = match &state {
            Some(state) => self.cache.peek(state.frontier, BlockKind::Send).is_some(),
            None => self
                .cache
                .peek(BlockHash::from(account.public_key()), BlockKind::Receive)
                .is_some(),
        };

        Ok(AccountStatus {
            account,
            opened: state.is_some(),
            balance: state.as_ref().map(|s| s.balance).unwrap_or(Raw::ZERO),
            frontier: state.as_ref().map(|s| s.frontier),
            representative: state.as_ref().and_then(|s| s.representative),
            block_count: state.as_ref().map(|s| s.block_count).unwrap_or(0),
            pending_count: pending.len(),
            pending_total,
            needs_receive: !pending.is_empty(),
            work_ready,
        })
    }

    /// Precompute work for the account's next block: a send on the
    /// frontier, or the open block for an unopened account.
    pub async fn warm_work(&self, address: &str) -> Result<WarmResult, OperationError> {
        let account = parse_account("address", address)?;
        let state = self.fetch_state(&account).await?;
        let (root, kind) = if state.is_opened() {
            (state.frontier, BlockKind::Send)
        } else {
            (BlockHash::from(account.public_key()), BlockKind::Receive)
        };

        let cached = self.cache.precompute(root, kind, false).await.is_some();
        nano_telemetry::log_block_event!(
            debug,
            subsystems::ORCHESTRATOR,
            "Work warmed",
            account,
            root,
            kind = %kind,
            cached = cached
        );
        Ok(WarmResult {
            account,
            root,
            kind,
            cached,
        })
    }

    /// Open an account by receiving whatever is pending for it.
    ///
    /// An account that is already open is left alone.
    pub async fn initialize_account(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<InitializeResult, OperationError> {
        let (account, keys) = authorize("address", address, private_key)?;
        if self.rpc.account_info(&account).await?.is_some() {
            return Ok(InitializeResult {
                account,
                already_opened: true,
                opened: true,
                report: None,
            });
        }

        let report = self.drain_pending(&account, &keys).await?;
        if report.outcomes.is_empty() {
            return Err(OperationError::AccountNotInitialized {
                account: account.encode(),
            });
        }
        Ok(InitializeResult {
            account,
            already_opened: false,
            opened: report.received_count() > 0,
            report: Some(report),
        })
    }
}
