//! Receive orchestration.

use super::{authorize, BlockOrchestrator, Draft};
use crate::domain::{OperationError, ReceiveOutcome, ReceiveReport, ReceivedBlock};
use nano_telemetry::subsystems;
use shared_crypto::{BalanceDelta, NanoKeyPair};
use shared_types::{Account, AccountState, BlockKind, BlockSubtype, Link, PendingBlock};
use std::collections::HashSet;

impl BlockOrchestrator {
    /// Receive every pending block for `address`.
    ///
    /// Blocks are processed one at a time because each one's `previous` is
    /// the hash of the block before it. A failed block is recorded and the
    /// loop moves on; only failures before the first block (bad input, the
    /// initial reads) are returned as `Err`.
    pub async fn receive_all_pending(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<ReceiveReport, OperationError> {
        let (account, keys) = authorize("address", address, private_key)?;
        self.drain_pending(&account, &keys).await
    }

    /// Drain `pending` page by page until a page comes back short, holds
    /// nothing new, or `pending_pages` is reached. Blocks that failed stay
    /// pending, so each page asks for that many more.
    pub(crate) async fn drain_pending(
        &self,
        account: &Account,
        keys: &NanoKeyPair,
    ) -> Result<ReceiveReport, OperationError> {
        let mut state = self.fetch_state(account).await?;
        let mut outcomes = Vec::new();
        let mut attempted = HashSet::new();
        let mut failed = 0u32;

        'pages: for page_number in 1..=self.config.pending_pages {
            let count = self.config.pending_count.saturating_add(failed);
            let page = match self
                .rpc
                .pending(account, count, self.config.pending_threshold)
                .await
            {
                Ok(page) => page,
                Err(e) if page_number == 1 => return Err(e.into()),
                Err(e) => {
                    nano_telemetry::log_event!(
                        warn,
                        subsystems::ORCHESTRATOR,
                        "Pending page read failed, stopping",
                        account = %account,
                        page = page_number,
                        error = %e
                    );
                    break;
                }
            };
            let last_page = page.len() < count as usize;
            let unseen: Vec<PendingBlock> = page
                .into_iter()
                .filter(|block| attempted.insert(block.hash))
                .collect();
            if unseen.is_empty() {
                break;
            }

            nano_telemetry::log_event!(
                info,
                subsystems::ORCHESTRATOR,
                "Receiving pending blocks",
                account = %account,
                page = page_number,
                pending = unseen.len(),
                opened = state.is_opened()
            );

            let mut blocks = unseen.iter().enumerate();
            while let Some((index, block)) = blocks.next() {
                let submitted = match self.receive_one(account, keys, &mut state, block).await {
                    Ok(submitted) => submitted,
                    Err(error) => {
                        nano_telemetry::log_block_event!(
                            warn,
                            subsystems::ORCHESTRATOR,
                            "Pending block not received",
                            account,
                            block.hash,
                            error = %error
                        );
                        outcomes.push(ReceiveOutcome::Failed {
                            pending_hash: block.hash,
                            amount: block.amount,
                            error,
                        });
                        failed = failed.saturating_add(1);
                        // Best effort: the failed attempt may have left the
                        // local view behind the node.
                        if let Ok(fresh) = self.fetch_state(account).await {
                            state = fresh;
                        }
                        continue;
                    }
                };

                let previous = submitted.block.previous;
                outcomes.push(ReceiveOutcome::Received(ReceivedBlock {
                    pending_hash: block.hash,
                    hash: submitted.hash,
                    previous,
                    amount: block.amount,
                    subtype: submitted.subtype,
                    balance: submitted.block.balance,
                }));

                match self.await_frontier(account, submitted.hash).await {
                    Ok(fresh) => state = fresh,
                    Err(error) => {
                        // Nothing else can be built safely on an unconfirmed
                        // frontier.
                        for (_, rest) in blocks.by_ref() {
                            outcomes.push(ReceiveOutcome::Failed {
                                pending_hash: rest.hash,
                                amount: rest.amount,
                                error: error.clone(),
                            });
                        }
                        state.frontier = submitted.hash;
                        state.balance = submitted.block.balance;
                        break 'pages;
                    }
                }

                if index + 1 < unseen.len() || !last_page {
                    self.precompute_next(state.frontier, BlockKind::Receive);
                }
            }

            if last_page {
                break;
            }
        }

        let report = ReceiveReport {
            account: *account,
            outcomes,
            final_balance: state.balance,
            frontier: state.frontier,
        };
        nano_telemetry::log_event!(
            info,
            subsystems::ORCHESTRATOR,
            "Pending blocks processed",
            account = %account,
            received = report.received_count(),
            failed = report.failed_count(),
            balance = %report.final_balance
        );
        Ok(report)
    }

    async fn receive_one(
        &self,
        account: &Account,
        keys: &NanoKeyPair,
        state: &mut AccountState,
        pending: &PendingBlock,
    ) -> Result<super::Submitted, OperationError> {
        self.submit(account, keys, state, |state| {
            let subtype = if state.is_opened() {
                BlockSubtype::Receive
            } else {
                BlockSubtype::Open
            };
            Ok(Draft {
                subtype,
                previous: state.frontier,
                representative: self.representative_for(account, state),
                delta: BalanceDelta::Credit(pending.amount),
                link: Link::from(pending.hash),
            })
        })
        .await
    }
}
