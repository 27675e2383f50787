//! # Simulated Node
//!
//! Answers the node's JSON RPC actions from an in-memory ledger. Plugged
//! into `RpcTransport` through the `NodeConnector` port, so every request
//! goes through the production request building and reply decoding.
//!
//! `process` enforces what the network does:
//! - the signature verifies against the block hash
//! - the work meets the threshold for the block's subtype and root
//! - `previous` is the account's frontier
//! - a receive credits exactly one pending block, a send debits
//!
//! Replies use the node's error strings (`Fork`, `Gap previous block`,
//! `Block work is less than threshold`, `Old block`, `Account not found`).

use async_trait::async_trait;
use nm_01_rpc_transport::{NodeConnector, NodeEndpoint, TransportError};
use nm_compute::backends::cpu::CpuEngine;
use nm_compute::ComputeEngine;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use shared_crypto::{meets_threshold, verify_state_block};
use shared_types::{
    Account, BlockHash, BlockKind, BlockSubtype, Link, PublicKey, Raw, StateBlock,
};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
struct Chain {
    frontier: BlockHash,
    balance: Raw,
    representative: Account,
    block_count: u64,
}

#[derive(Debug, Clone)]
struct Incoming {
    amount: Raw,
    source: Option<Account>,
}

#[derive(Default)]
struct Ledger {
    chains: HashMap<Account, Chain>,
    /// Per account, keyed by send hash.
    receivable: HashMap<Account, BTreeMap<BlockHash, Incoming>>,
    known_blocks: HashSet<BlockHash>,
    /// Chains as they were before the latest publish, served while lagging.
    stale: HashMap<Account, Option<Chain>>,
    stale_reads: HashMap<Account, u32>,
    lag_per_publish: u32,
    rejections: VecDeque<String>,
    accepted: Vec<(StateBlock, BlockSubtype, BlockHash)>,
    calls: HashMap<String, u64>,
    funding_counter: u64,
}

/// In-memory node. Cheap to clone; clones share the ledger.
#[derive(Clone)]
pub struct SimulatedNode {
    ledger: Arc<Mutex<Ledger>>,
    engine: Arc<CpuEngine>,
    send_threshold: u64,
    receive_threshold: u64,
}

impl SimulatedNode {
    pub fn new(send_threshold: u64, receive_threshold: u64) -> Self {
        Self {
            ledger: Arc::new(Mutex::new(Ledger::default())),
            engine: Arc::new(CpuEngine::new()),
            send_threshold,
            receive_threshold,
        }
    }

    fn threshold(&self, kind: BlockKind) -> u64 {
        match kind {
            BlockKind::Send => self.send_threshold,
            BlockKind::Receive => self.receive_threshold,
        }
    }

    /// An external send of `amount` raw to `account`. Returns its hash.
    pub fn fund(&self, account: &Account, amount: u128) -> BlockHash {
        let mut ledger = self.ledger.lock();
        ledger.funding_counter += 1;
        let mut bytes = [0xF0; 32];
        bytes[24..].copy_from_slice(&ledger.funding_counter.to_be_bytes());
        let hash = BlockHash::from_bytes(bytes);
        ledger.known_blocks.insert(hash);
        ledger.receivable.entry(*account).or_default().insert(
            hash,
            Incoming {
                amount: Raw::new(amount),
                source: None,
            },
        );
        hash
    }

    /// Reject the next `process` call with `message`.
    pub fn reject_next(&self, message: &str) {
        self.ledger.lock().rejections.push_back(message.to_string());
    }

    /// After each publish, serve the account's previous state for `reads`
    /// `account_info` calls.
    pub fn lag_reads(&self, reads: u32) {
        self.ledger.lock().lag_per_publish = reads;
    }

    pub fn balance_of(&self, account: &Account) -> Raw {
        self.ledger
            .lock()
            .chains
            .get(account)
            .map(|c| c.balance)
            .unwrap_or(Raw::ZERO)
    }

    pub fn frontier_of(&self, account: &Account) -> Option<BlockHash> {
        self.ledger.lock().chains.get(account).map(|c| c.frontier)
    }

    pub fn receivable_count(&self, account: &Account) -> usize {
        self.ledger
            .lock()
            .receivable
            .get(account)
            .map(BTreeMap::len)
            .unwrap_or(0)
    }

    /// Blocks accepted by `process`, in order.
    pub fn accepted(&self) -> Vec<(StateBlock, BlockSubtype, BlockHash)> {
        self.ledger.lock().accepted.clone()
    }

    /// Number of requests for `action`.
    pub fn calls(&self, action: &str) -> u64 {
        self.ledger.lock().calls.get(action).copied().unwrap_or(0)
    }

    /// Answer one JSON request body.
    pub fn handle(&self, body: &Value) -> Value {
        let action = body.get("action").and_then(Value::as_str).unwrap_or("");
        *self
            .ledger
            .lock()
            .calls
            .entry(action.to_string())
            .or_default() += 1;

        let result = match action {
            "account_info" => self.account_info(body),
            "pending" | "receivable" => self.pending(body),
            "account_balance" => self.account_balance(body),
            "work_generate" => self.work_generate(body),
            "process" => self.process(body),
            other => Err(format!("Unknown command: {other}")),
        };
        result.unwrap_or_else(|message| json!({ "error": message }))
    }

    fn account_param(body: &Value) -> Result<Account, String> {
        body.get("account")
            .and_then(Value::as_str)
            .and_then(|a| Account::parse(a).ok())
            .ok_or_else(|| "Bad account number".to_string())
    }

    fn account_info(&self, body: &Value) -> Result<Value, String> {
        let account = Self::account_param(body)?;
        let mut ledger = self.ledger.lock();

        let lagging = ledger
            .stale_reads
            .get_mut(&account)
            .filter(|reads| **reads > 0)
            .map(|reads| {
                *reads -= 1;
            })
            .is_some();
        let chain = if lagging {
            ledger.stale.get(&account).cloned().flatten()
        } else {
            ledger.chains.get(&account).cloned()
        };

        let chain = chain.ok_or_else(|| "Account not found".to_string())?;
        Ok(json!({
            "frontier": chain.frontier,
            "balance": chain.balance,
            "representative": chain.representative,
            "block_count": chain.block_count.to_string(),
        }))
    }

    fn pending(&self, body: &Value) -> Result<Value, String> {
        let account = Self::account_param(body)?;
        let count: usize = body
            .get("count")
            .and_then(Value::as_str)
            .and_then(|c| c.parse().ok())
            .unwrap_or(usize::MAX);
        let threshold: Raw = body
            .get("threshold")
            .and_then(Value::as_str)
            .and_then(|t| t.parse().ok())
            .unwrap_or(Raw::ZERO);

        let ledger = self.ledger.lock();
        let blocks: Map<String, Value> = ledger
            .receivable
            .get(&account)
            .into_iter()
            .flatten()
            .filter(|(_, incoming)| incoming.amount >= threshold)
            .take(count)
            .map(|(hash, incoming)| {
                let mut entry = json!({ "amount": incoming.amount });
                if let Some(source) = incoming.source {
                    entry["source"] = json!(source);
                }
                (hash.to_hex(), entry)
            })
            .collect();

        if blocks.is_empty() {
            Ok(json!({ "blocks": "" }))
        } else {
            Ok(json!({ "blocks": blocks }))
        }
    }

    fn account_balance(&self, body: &Value) -> Result<Value, String> {
        let account = Self::account_param(body)?;
        let ledger = self.ledger.lock();
        let balance = ledger
            .chains
            .get(&account)
            .map(|c| c.balance)
            .unwrap_or(Raw::ZERO);
        let receivable = ledger
            .receivable
            .get(&account)
            .into_iter()
            .flatten()
            .fold(Raw::ZERO, |sum, (_, i)| sum.checked_add(i.amount).unwrap_or(sum));
        Ok(json!({
            "balance": balance,
            "pending": receivable,
            "receivable": receivable,
        }))
    }

    fn work_generate(&self, body: &Value) -> Result<Value, String> {
        let root = body
            .get("hash")
            .and_then(Value::as_str)
            .and_then(|h| BlockHash::from_hex(h).ok())
            .ok_or_else(|| "Bad block hash".to_string())?;
        let kind = match body.get("difficulty").and_then(Value::as_str) {
            Some(d) if d == BlockKind::Send.threshold_hex() => BlockKind::Send,
            _ => BlockKind::Receive,
        };
        let cancel = AtomicBool::new(false);
        let work = self
            .engine
            .find_work(&root, self.threshold(kind), 0, u64::MAX, &cancel)
            .map_err(|e| e.to_string())?
            .ok_or_else(|| "Work generation cancelled".to_string())?;
        Ok(json!({ "work": work, "hash": root }))
    }

    fn process(&self, body: &Value) -> Result<Value, String> {
        let subtype: BlockSubtype = body
            .get("subtype")
            .cloned()
            .and_then(|s| serde_json::from_value(s).ok())
            .ok_or_else(|| "Invalid block subtype".to_string())?;
        let block: StateBlock = body
            .get("block")
            .cloned()
            .and_then(|b| serde_json::from_value(b).ok())
            .ok_or_else(|| "Block is invalid".to_string())?;
        let hash = self.apply(&block, subtype)?;
        Ok(json!({ "hash": hash }))
    }

    fn apply(&self, block: &StateBlock, subtype: BlockSubtype) -> Result<BlockHash, String> {
        let hash = verify_state_block(block).map_err(|_| "Bad signature".to_string())?;
        let mut ledger = self.ledger.lock();

        if let Some(message) = ledger.rejections.pop_front() {
            return Err(message);
        }
        if ledger.known_blocks.contains(&hash) {
            return Err("Old block".to_string());
        }

        let root = if block.previous.is_zero() {
            BlockHash::from(block.account.public_key())
        } else {
            block.previous
        };
        if !meets_threshold(&root, block.work, self.threshold(subtype.work_kind())) {
            return Err("Block work is less than threshold".to_string());
        }

        let current = ledger.chains.get(&block.account).cloned();
        match (&current, block.previous.is_zero()) {
            (Some(_), true) => return Err("Fork".to_string()),
            (None, false) => return Err("Gap previous block".to_string()),
            (Some(chain), false) if chain.frontier != block.previous => {
                return Err(if ledger.known_blocks.contains(&block.previous) {
                    "Fork".to_string()
                } else {
                    "Gap previous block".to_string()
                });
            }
            _ => {}
        }
        let before = current.as_ref().map(|c| c.balance).unwrap_or(Raw::ZERO);

        match subtype {
            BlockSubtype::Open | BlockSubtype::Receive => {
                if (subtype == BlockSubtype::Open) != current.is_none() {
                    return Err("Invalid block subtype".to_string());
                }
                let send_hash = BlockHash::from_bytes(*block.link.as_bytes());
                let incoming = ledger
                    .receivable
                    .get(&block.account)
                    .and_then(|r| r.get(&send_hash))
                    .cloned()
                    .ok_or_else(|| "Unreceivable".to_string())?;
                if before.checked_add(incoming.amount) != Some(block.balance) {
                    return Err("Balance and amount delta do not match".to_string());
                }
                if let Some(receivable) = ledger.receivable.get_mut(&block.account) {
                    receivable.remove(&send_hash);
                }
            }
            BlockSubtype::Send => {
                let amount = before
                    .checked_sub(block.balance)
                    .filter(|a| !a.is_zero())
                    .ok_or_else(|| "Negative spend".to_string())?;
                let destination = destination_of(&block.link);
                ledger.receivable.entry(destination).or_default().insert(
                    hash,
                    Incoming {
                        amount,
                        source: Some(block.account),
                    },
                );
            }
            BlockSubtype::Change => {
                if block.balance != before {
                    return Err("Balance mismatch".to_string());
                }
            }
        }

        let lag = ledger.lag_per_publish;
        ledger.stale.insert(block.account, current.clone());
        ledger.stale_reads.insert(block.account, lag);
        ledger.known_blocks.insert(hash);
        ledger.chains.insert(
            block.account,
            Chain {
                frontier: hash,
                balance: block.balance,
                representative: block.representative,
                block_count: current.map(|c| c.block_count).unwrap_or(0) + 1,
            },
        );
        ledger.accepted.push((block.clone(), subtype, hash));
        Ok(hash)
    }
}

fn destination_of(link: &Link) -> Account {
    Account::from_public_key(PublicKey::from_bytes(*link.as_bytes()))
}

#[async_trait]
impl NodeConnector for SimulatedNode {
    async fn post(
        &self,
        _node: &NodeEndpoint,
        body: &Value,
        _timeout: Duration,
    ) -> Result<Value, TransportError> {
        Ok(self.handle(body))
    }
}

/// Fails requests to chosen node URLs before handing the rest to the
/// simulated node. Can also drop replies after the node has applied the
/// request.
pub struct FlakyConnector {
    inner: SimulatedNode,
    rate_limited: HashSet<String>,
    unreachable: HashSet<String>,
    lost_replies: HashMap<String, HashSet<u32>>,
    seen: Mutex<HashMap<String, u32>>,
    attempts: Mutex<Vec<String>>,
}

impl FlakyConnector {
    pub fn new(inner: SimulatedNode) -> Self {
        Self {
            inner,
            rate_limited: HashSet::new(),
            unreachable: HashSet::new(),
            lost_replies: HashMap::new(),
            seen: Mutex::new(HashMap::new()),
            attempts: Mutex::new(Vec::new()),
        }
    }

    pub fn rate_limit(mut self, url: &str) -> Self {
        self.rate_limited.insert(url.to_string());
        self
    }

    pub fn unreachable(mut self, url: &str) -> Self {
        self.unreachable.insert(url.to_string());
        self
    }

    /// The `nth` request for `action` (1-based) reaches the node, but the
    /// caller sees a timeout.
    pub fn lose_reply(mut self, action: &str, nth: u32) -> Self {
        self.lost_replies
            .entry(action.to_string())
            .or_default()
            .insert(nth);
        self
    }

    /// URLs in the order they were tried.
    pub fn attempts(&self) -> Vec<String> {
        self.attempts.lock().clone()
    }
}

#[async_trait]
impl NodeConnector for FlakyConnector {
    async fn post(
        &self,
        node: &NodeEndpoint,
        body: &Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        self.attempts.lock().push(node.url.clone());
        if self.rate_limited.contains(&node.url) {
            return Err(TransportError::RateLimited {
                node: node.url.clone(),
            });
        }
        if self.unreachable.contains(&node.url) {
            return Err(TransportError::Unreachable {
                node: node.url.clone(),
                reason: "connection refused".to_string(),
            });
        }
        let reply = self.inner.post(node, body, timeout).await?;

        let action = body.get("action").and_then(Value::as_str).unwrap_or("");
        let nth = {
            let mut seen = self.seen.lock();
            let count = seen.entry(action.to_string()).or_default();
            *count += 1;
            *count
        };
        match self.lost_replies.get(action) {
            Some(lost) if lost.contains(&nth) => Err(TransportError::Timeout {
                node: node.url.clone(),
                elapsed_ms: timeout.as_millis() as u64,
            }),
            _ => Ok(reply),
        }
    }
}
