//! In-memory ledger and helpers for orchestrator tests.

use super::BlockOrchestrator;
use crate::domain::OrchestratorConfig;
use async_trait::async_trait;
use nm_01_rpc_transport::{AccountBalance, NodeRpc, TransportError};
use nm_02_work_cache::{WorkCache, WorkCacheConfig, WorkError, WorkGenerator, WorkSettings};
use parking_lot::Mutex;
use shared_crypto::{verify_state_block, NanoKeyPair};
use shared_types::{
    Account, AccountState, BlockHash, BlockKind, BlockSubtype, Link, PendingBlock, Raw,
    StateBlock, WorkToken,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub fn keypair(seed: u8) -> NanoKeyPair {
    NanoKeyPair::from_private_key([seed; 32])
}

pub fn fast_config() -> OrchestratorConfig {
    OrchestratorConfig {
        settle_delay: Duration::ZERO,
        frontier_refresh_attempts: 3,
        frontier_refresh_delay: Duration::ZERO,
        precompute_next: false,
        ..Default::default()
    }
}

#[derive(Default)]
struct LedgerState {
    accounts: HashMap<Account, AccountState>,
    pending: HashMap<Account, Vec<PendingBlock>>,
    /// State served while a read is lagging.
    previous: HashMap<Account, AccountState>,
    lagging_reads: u32,
    lag_per_block: u32,
    rejections: VecDeque<String>,
    lost_replies: u32,
    silent: bool,
    rejected_links: Vec<Link>,
    published: Vec<(StateBlock, BlockSubtype, BlockHash)>,
}

/// A node that validates chains the way the network does: `previous` must
/// be the frontier, receives must match a pending block, balances must add
/// up and signatures must verify.
#[derive(Clone, Default)]
pub struct MockLedger {
    state: Arc<Mutex<LedgerState>>,
    process_calls: Arc<AtomicU64>,
}

impl MockLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open `account` with `balance` raw on an arbitrary frontier.
    pub fn fund(&self, account: &Account, balance: u128) {
        let mut frontier = [0x5A; 32];
        frontier[..8].copy_from_slice(&account.public_key().as_bytes()[..8]);
        self.state.lock().accounts.insert(
            *account,
            AccountState {
                frontier: BlockHash::from_bytes(frontier),
                balance: Raw::new(balance),
                representative: Some(*account),
                block_count: 1,
            },
        );
    }

    pub fn add_pending(&self, account: &Account, tag: u8, amount: u128) -> BlockHash {
        let hash = BlockHash::from_bytes([tag; 32]);
        self.state
            .lock()
            .pending
            .entry(*account)
            .or_default()
            .push(PendingBlock {
                hash,
                amount: Raw::new(amount),
                source: None,
            });
        hash
    }

    /// Reject the next `process` calls with these messages, in order.
    pub fn reject_next(&self, message: &str) {
        self.state.lock().rejections.push_back(message.to_string());
    }

    /// Apply the next `count` blocks but answer with a timeout.
    pub fn lose_replies(&self, count: u32) {
        self.state.lock().lost_replies = count;
    }

    /// Time out every `process` call without applying it.
    pub fn go_silent(&self) {
        self.state.lock().silent = true;
    }

    /// Always reject a receive of this pending block.
    pub fn reject_receive_of(&self, pending: BlockHash) {
        self.state.lock().rejected_links.push(Link::from(pending));
    }

    /// After each publish, serve the old state for this many reads.
    pub fn lag_reads(&self, reads: u32) {
        self.state.lock().lag_per_block = reads;
    }

    pub fn state_of(&self, account: &Account) -> Option<AccountState> {
        self.state.lock().accounts.get(account).cloned()
    }

    pub fn pending_of(&self, account: &Account) -> Vec<PendingBlock> {
        self.state
            .lock()
            .pending
            .get(account)
            .cloned()
            .unwrap_or_default()
    }

    pub fn published(&self) -> Vec<(StateBlock, BlockSubtype, BlockHash)> {
        self.state.lock().published.clone()
    }

    pub fn process_calls(&self) -> u64 {
        self.process_calls.load(Ordering::SeqCst)
    }

    fn apply(&self, block: &StateBlock, subtype: BlockSubtype) -> Result<BlockHash, String> {
        let hash = verify_state_block(block).map_err(|_| "Bad signature".to_string())?;
        let mut ledger = self.state.lock();

        if let Some(message) = ledger.rejections.pop_front() {
            return Err(message);
        }
        if ledger.published.iter().any(|(_, _, known)| *known == hash) {
            return Err("Old block".to_string());
        }

        let current = ledger
            .accounts
            .get(&block.account)
            .cloned()
            .unwrap_or_else(AccountState::unopened);
        if block.previous != current.frontier {
            return Err(if current.is_opened() && block.previous.is_zero() {
                "Fork".to_string()
            } else {
                "Gap previous block".to_string()
            });
        }

        match subtype {
            BlockSubtype::Open | BlockSubtype::Receive => {
                if (subtype == BlockSubtype::Open) == current.is_opened() {
                    return Err("Invalid block subtype".to_string());
                }
                if ledger.rejected_links.contains(&block.link) {
                    return Err("Unreceivable".to_string());
                }
                let pending = ledger.pending.entry(block.account).or_default();
                let index = pending
                    .iter()
                    .position(|p| Link::from(p.hash) == block.link)
                    .ok_or_else(|| "Unreceivable".to_string())?;
                let expected = current.balance.checked_add(pending[index].amount);
                if expected != Some(block.balance) {
                    return Err("Balance and amount delta do not match".to_string());
                }
                pending.remove(index);
            }
            BlockSubtype::Send => {
                let amount = current
                    .balance
                    .checked_sub(block.balance)
                    .filter(|amount| !amount.is_zero())
                    .ok_or_else(|| "Negative spend".to_string())?;
                let destination =
                    Account::from_public_key(shared_types::PublicKey::from_bytes(
                        *block.link.as_bytes(),
                    ));
                ledger
                    .pending
                    .entry(destination)
                    .or_default()
                    .push(PendingBlock {
                        hash,
                        amount,
                        source: Some(block.account),
                    });
            }
            BlockSubtype::Change => {}
        }

        let lag = ledger.lag_per_block;
        ledger.previous.insert(block.account, current.clone());
        ledger.lagging_reads = lag;
        ledger.accounts.insert(
            block.account,
            AccountState {
                frontier: hash,
                balance: block.balance,
                representative: Some(block.representative),
                block_count: current.block_count + 1,
            },
        );
        ledger.published.push((block.clone(), subtype, hash));
        Ok(hash)
    }
}

#[async_trait]
impl NodeRpc for MockLedger {
    async fn account_info(&self, account: &Account) -> Result<Option<AccountState>, TransportError> {
        let mut ledger = self.state.lock();
        if ledger.lagging_reads > 0 {
            ledger.lagging_reads -= 1;
            if let Some(previous) = ledger.previous.get(account) {
                return Ok(previous.is_opened().then(|| previous.clone()));
            }
        }
        Ok(ledger.accounts.get(account).cloned())
    }

    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Raw,
    ) -> Result<Vec<PendingBlock>, TransportError> {
        Ok(self
            .pending_of(account)
            .into_iter()
            .filter(|p| p.amount >= threshold)
            .take(count as usize)
            .collect())
    }

    async fn work_generate(
        &self,
        _root: &BlockHash,
        _kind: BlockKind,
    ) -> Result<WorkToken, TransportError> {
        Err(TransportError::Node {
            message: "work_generate is disabled".to_string(),
        })
    }

    async fn process(
        &self,
        block: &StateBlock,
        subtype: BlockSubtype,
    ) -> Result<BlockHash, TransportError> {
        self.process_calls.fetch_add(1, Ordering::SeqCst);
        if self.state.lock().silent {
            return Err(TransportError::Timeout {
                node: "mock".to_string(),
                elapsed_ms: 0,
            });
        }
        let hash = self
            .apply(block, subtype)
            .map_err(|message| TransportError::Node { message })?;

        let mut ledger = self.state.lock();
        if ledger.lost_replies > 0 {
            ledger.lost_replies -= 1;
            return Err(TransportError::Timeout {
                node: "mock".to_string(),
                elapsed_ms: 0,
            });
        }
        Ok(hash)
    }

    async fn account_balance(&self, account: &Account) -> Result<AccountBalance, TransportError> {
        let balance = self
            .state_of(account)
            .map(|s| s.balance)
            .unwrap_or(Raw::ZERO);
        let receivable = self
            .pending_of(account)
            .iter()
            .fold(Raw::ZERO, |sum, p| sum.checked_add(p.amount).unwrap_or(sum));
        Ok(AccountBalance {
            balance,
            receivable,
        })
    }
}

/// Hands out sequential work values; the ledger does not check work.
#[derive(Default)]
pub struct CountingGenerator {
    pub calls: AtomicU64,
}

impl CountingGenerator {
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WorkGenerator for CountingGenerator {
    fn name(&self) -> &'static str {
        "counting"
    }

    async fn generate(&self, _root: &BlockHash, _kind: BlockKind) -> Result<WorkToken, WorkError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(WorkToken::new(n + 1))
    }
}

pub fn orchestrator_with_generator(
    ledger: MockLedger,
    config: OrchestratorConfig,
    generator: Arc<CountingGenerator>,
) -> BlockOrchestrator {
    let cache = Arc::new(WorkCache::new(
        WorkCacheConfig::default(),
        WorkSettings::default(),
        generator,
    ));
    BlockOrchestrator::new(config, Arc::new(ledger), cache).unwrap()
}

pub fn orchestrator_with(ledger: MockLedger, config: OrchestratorConfig) -> BlockOrchestrator {
    orchestrator_with_generator(ledger, config, Arc::new(CountingGenerator::default()))
}

pub fn orchestrator(ledger: MockLedger, config: OrchestratorConfig) -> BlockOrchestrator {
    orchestrator_with(ledger, config)
}
