//! Block orchestrator service.
//!
//! Every block goes through the same step: build a draft from the latest
//! account state, obtain work for its root, sign, submit, invalidate the
//! work key. Insufficient-work and stale-frontier rejections repeat the
//! whole step from a fresh `account_info` read.

mod receive;
mod send;
mod status;

use crate::domain::{
    classify_rejection, ConfigError, OperationError, OrchestratorConfig, Rejection,
};
use crate::ports::BlockOrchestratorApi;
use async_trait::async_trait;
use nano_telemetry::subsystems;
use nm_01_rpc_transport::NodeRpc;
use nm_02_work_cache::WorkCache;
use shared_crypto::{sign_state_block, BalanceDelta, BlockTemplate, CryptoError, NanoKeyPair};
use shared_types::{
    is_valid_private_key, Account, AccountState, BlockHash, BlockKind, BlockSubtype, Link, Raw,
    StateBlock,
};
use std::sync::Arc;
use tracing::debug;

use crate::domain::{AccountStatus, InitializeResult, ReceiveReport, SendReceipt, WarmResult};

/// Receive and send orchestration over a node and a shared work cache.
pub struct BlockOrchestrator {
    config: OrchestratorConfig,
    default_representative: Option<Account>,
    rpc: Arc<dyn NodeRpc>,
    cache: Arc<WorkCache>,
}

/// What a step intends to publish, before work and signature.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Draft {
    subtype: BlockSubtype,
    previous: BlockHash,
    representative: Account,
    delta: BalanceDelta,
    link: Link,
}

impl Draft {
    /// Work root: the frontier, or the account key for an open block.
    fn root(&self, account: &Account) -> BlockHash {
        if self.previous.is_zero() {
            BlockHash::from(account.public_key())
        } else {
            self.previous
        }
    }

    fn amount(&self) -> Raw {
        match self.delta {
            BalanceDelta::Credit(amount) | BalanceDelta::Debit(amount) => amount,
        }
    }
}

/// A block the node accepted.
#[derive(Debug, Clone)]
pub(crate) struct Submitted {
    hash: BlockHash,
    block: StateBlock,
    subtype: BlockSubtype,
}

impl BlockOrchestrator {
    pub fn new(
        config: OrchestratorConfig,
        rpc: Arc<dyn NodeRpc>,
        cache: Arc<WorkCache>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let default_representative = config.representative()?;
        Ok(Self {
            config,
            default_representative,
            rpc,
            cache,
        })
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<WorkCache> {
        &self.cache
    }

    /// Representative for a block: the account's own, else the configured
    /// default, else the account itself.
    fn representative_for(&self, account: &Account, state: &AccountState) -> Account {
        state
            .representative
            .or(self.default_representative)
            .unwrap_or(*account)
    }

    /// Current state; an account the node does not know is unopened.
    async fn fetch_state(&self, account: &Account) -> Result<AccountState, OperationError> {
        Ok(self
            .rpc
            .account_info(account)
            .await?
            .unwrap_or_else(AccountState::unopened))
    }

    /// Re-read `account_info` until the node reports `expected` as the
    /// frontier. The n-th retry waits `n * frontier_refresh_delay`.
    async fn await_frontier(
        &self,
        account: &Account,
        expected: BlockHash,
    ) -> Result<AccountState, OperationError> {
        let attempts = self.config.frontier_refresh_attempts;
        let mut observed = None;

        for attempt in 1..=attempts {
            match self.rpc.account_info(account).await {
                Ok(Some(state)) if state.frontier == expected => return Ok(state),
                Ok(Some(state)) => observed = Some(state.frontier),
                Ok(None) => {}
                Err(e) => {
                    debug!(account = %account, attempt, error = %e, "Frontier refresh failed");
                }
            }
            if attempt < attempts {
                tokio::time::sleep(self.config.frontier_refresh_delay * attempt).await;
            }
        }

        nano_telemetry::log_block_event!(
            warn,
            subsystems::ORCHESTRATOR,
            "Frontier did not converge",
            account,
            expected,
            attempts = attempts
        );
        Err(OperationError::StaleFrontier {
            account: account.encode(),
            expected,
            observed,
            attempts,
        })
    }

    /// Build, sign and publish one block.
    ///
    /// `build` is re-evaluated against fresh state on every attempt, so its
    /// precondition checks see the same state the block is built on.
    async fn submit<F>(
        &self,
        account: &Account,
        keys: &NanoKeyPair,
        state: &mut AccountState,
        build: F,
    ) -> Result<Submitted, OperationError>
    where
        F: Fn(&AccountState) -> Result<Draft, OperationError>,
    {
        let max_attempts = self.config.submit_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            let draft = build(state)?;
            let root = draft.root(account);
            let kind = draft.subtype.work_kind();

            let obtained = self.cache.obtain(root, kind).await?;
            let template = BlockTemplate {
                account: *account,
                previous: draft.previous,
                representative: draft.representative,
                wallet_balance: state.balance,
                delta: draft.delta,
                link: draft.link,
                work: obtained.work,
            };
            let signed = match sign_state_block(&template, keys) {
                Ok(signed) => signed,
                Err(e) => {
                    self.cache.invalidate(root, kind);
                    return Err(signing_error(account, state.balance, draft.amount(), e));
                }
            };

            // An unconfirmed publish is repeated with the identical block; a
            // copy the node already holds comes back as "Old block".
            let mut result = self.rpc.process(&signed.block, draft.subtype).await;
            while attempt < max_attempts && matches!(&result, Err(e) if e.is_unconfirmed()) {
                attempt += 1;
                debug!(
                    account = %account,
                    hash = %signed.hash,
                    attempt,
                    "Publish unconfirmed, resending"
                );
                result = self.rpc.process(&signed.block, draft.subtype).await;
            }
            self.cache.invalidate(root, kind);

            let error = match result {
                Ok(hash) => return Ok(published(account, hash, signed.block, &draft, attempt)),
                Err(e) => e,
            };

            if error.is_unconfirmed() {
                nano_telemetry::log_block_event!(
                    warn,
                    subsystems::ORCHESTRATOR,
                    "Publish unconfirmed",
                    account,
                    signed.hash,
                    attempts = attempt
                );
                return Err(OperationError::PublishUnconfirmed {
                    account: account.encode(),
                    hash: signed.hash,
                    attempts: attempt,
                    reason: error.to_string(),
                });
            }
            let message = match error.node_message() {
                Some(message) => message.to_string(),
                None => return Err(error.into()),
            };
            let rejection = classify_rejection(&message);
            match rejection {
                Rejection::AlreadyPublished => {
                    return Ok(published(account, signed.hash, signed.block, &draft, attempt))
                }
                Rejection::Other => {
                    return Err(OperationError::BlockRejected {
                        account: account.encode(),
                        subtype: draft.subtype,
                        amount: draft.amount(),
                        balance: state.balance,
                        message,
                    })
                }
                Rejection::InsufficientWork | Rejection::StaleFrontier => {}
            }

            nano_telemetry::log_block_event!(
                warn,
                subsystems::ORCHESTRATOR,
                "Block rejected, rebuilding from fresh state",
                account,
                signed.hash,
                reason = %message,
                attempt = attempt
            );
            *state = self.fetch_state(account).await?;
            if state.frontier == signed.hash {
                return Ok(published(account, signed.hash, signed.block, &draft, attempt));
            }

            if attempt >= max_attempts {
                return Err(match rejection {
                    Rejection::InsufficientWork => OperationError::InsufficientWork {
                        account: account.encode(),
                        root,
                        attempts: attempt,
                    },
                    _ => OperationError::StaleFrontier {
                        account: account.encode(),
                        expected: draft.previous,
                        observed: state.is_opened().then_some(state.frontier),
                        attempts: attempt,
                    },
                });
            }
        }
    }

    /// Warm the cache for the block that will follow `root`.
    fn precompute_next(&self, root: BlockHash, kind: BlockKind) {
        if self.config.precompute_next {
            drop(self.cache.spawn_precompute(root, kind));
        }
    }
}

fn published(
    account: &Account,
    hash: BlockHash,
    block: StateBlock,
    draft: &Draft,
    attempt: u32,
) -> Submitted {
    nano_telemetry::log_block_event!(
        info,
        subsystems::ORCHESTRATOR,
        "Block published",
        account,
        hash,
        subtype = %draft.subtype,
        amount = %draft.amount(),
        balance = %block.balance,
        attempt = attempt
    );
    Submitted {
        hash,
        block,
        subtype: draft.subtype,
    }
}

fn signing_error(account: &Account, balance: Raw, amount: Raw, error: CryptoError) -> OperationError {
    match error {
        CryptoError::BalanceOverflow { .. } => OperationError::BalanceOverflow {
            account: account.encode(),
            balance,
            amount,
        },
        other => OperationError::Signing {
            reason: other.to_string(),
        },
    }
}

/// Parse an address supplied for `field`.
pub(crate) fn parse_account(field: &str, address: &str) -> Result<Account, OperationError> {
    Account::parse(address.trim()).map_err(|e| OperationError::InvalidAddress {
        field: field.to_string(),
        address: address.to_string(),
        reason: e.to_string(),
    })
}

/// Parse the address and check that `private_key` controls it.
pub(crate) fn authorize(
    field: &str,
    address: &str,
    private_key: &str,
) -> Result<(Account, NanoKeyPair), OperationError> {
    let account = parse_account(field, address)?;
    if !is_valid_private_key(private_key) {
        return Err(OperationError::InvalidPrivateKey);
    }
    let keys =
        NanoKeyPair::from_hex(private_key.trim()).map_err(|_| OperationError::InvalidPrivateKey)?;
    let derived = keys.account();
    if derived != account {
        return Err(OperationError::KeyMismatch {
            address: account.encode(),
            derived: derived.encode(),
        });
    }
    Ok((account, keys))
}

#[async_trait]
impl BlockOrchestratorApi for BlockOrchestrator {
    async fn receive_all_pending(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<ReceiveReport, OperationError> {
        BlockOrchestrator::receive_all_pending(self, address, private_key).await
    }

    async fn send_transaction(
        &self,
        from_address: &str,
        to_address: &str,
        amount_raw: &str,
        private_key: &str,
    ) -> Result<SendReceipt, OperationError> {
        BlockOrchestrator::send_transaction(self, from_address, to_address, amount_raw, private_key)
            .await
    }

    async fn account_status(&self, address: &str) -> Result<AccountStatus, OperationError> {
        BlockOrchestrator::account_status(self, address).await
    }

    async fn warm_work(&self, address: &str) -> Result<WarmResult, OperationError> {
        BlockOrchestrator::warm_work(self, address).await
    }

    async fn initialize_account(
        &self,
        address: &str,
        private_key: &str,
    ) -> Result<InitializeResult, OperationError> {
        BlockOrchestrator::initialize_account(self, address, private_key).await
    }
}

#[cfg(test)]
pub(crate) mod testing;
