//! Send orchestration.

use super::{authorize, parse_account, BlockOrchestrator, Draft};
use crate::domain::{OperationError, SendReceipt};
use nano_telemetry::subsystems;
use shared_crypto::BalanceDelta;
use shared_types::{BlockKind, BlockSubtype, Link, Raw};

/// Parse a raw amount; zero is not a transfer.
pub(crate) fn parse_amount(amount: &str) -> Result<Raw, OperationError> {
    let raw = amount
        .trim()
        .parse::<Raw>()
        .map_err(|e| OperationError::InvalidAmount {
            amount: amount.to_string(),
            reason: e.to_string(),
        })?;
    if raw.is_zero() {
        return Err(OperationError::InvalidAmount {
            amount: amount.to_string(),
            reason: "amount must be greater than zero".to_string(),
        });
    }
    Ok(raw)
}

impl BlockOrchestrator {
    /// Send `amount_raw` from `from_address` to `to_address`.
    ///
    /// Pending funds are received first so the send builds on a frontier
    /// that will not move underneath it. The balance check runs before any
    /// work is requested.
    pub async fn send_transaction(
        &self,
        from_address: &str,
        to_address: &str,
        amount_raw: &str,
        private_key: &str,
    ) -> Result<SendReceipt, OperationError> {
        let (account, keys) = authorize("fromAddress", from_address, private_key)?;
        let destination = parse_account("toAddress", to_address)?;
        let amount = parse_amount(amount_raw)?;

        let drained = self.drain_pending(&account, &keys).await?;
        let received_first = drained.received_count();
        if received_first > 0 {
            tokio::time::sleep(self.config.settle_delay).await;
        }

        let mut state = self.fetch_state(&account).await?;
        let previous_balance = state.balance;

        let submitted = self
            .submit(&account, &keys, &mut state, |state| {
                if !state.is_opened() {
                    return Err(OperationError::AccountNotInitialized {
                        account: account.encode(),
                    });
                }
                if state.balance < amount {
                    return Err(OperationError::InsufficientBalance {
                        account: account.encode(),
                        current: state.balance,
                        requested: amount,
                        shortfall: amount.saturating_sub(state.balance),
                    });
                }
                Ok(Draft {
                    subtype: BlockSubtype::Send,
                    previous: state.frontier,
                    representative: self.representative_for(&account, state),
                    delta: BalanceDelta::Debit(amount),
                    link: Link::from(destination.public_key()),
                })
            })
            .await?;

        self.precompute_next(submitted.hash, BlockKind::Send);

        nano_telemetry::log_block_event!(
            info,
            subsystems::ORCHESTRATOR,
            "Send published",
            account,
            submitted.hash,
            to = %destination,
            amount = %amount,
            received_first = received_first
        );

        Ok(SendReceipt {
            hash: submitted.hash,
            from: account,
            to: destination,
            amount,
            previous_balance: submitted
                .block
                .balance
                .checked_add(amount)
                .unwrap_or(previous_balance),
            new_balance: submitted.block.balance,
            received_first,
        })
    }
}
