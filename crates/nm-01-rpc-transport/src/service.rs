//! RPC transport service.
//!
//! `RpcTransport::call` is the only place that talks to a node. It owns the
//! failover state and runs an explicit bounded loop: a retryable failure
//! (timeout, 429, unreachable) rotates to the next node and backs off; any
//! other failure is returned immediately.
//!
//! Actions that change the ledger go through `call_at_most_once`, which
//! still rotates on a timeout but hands the timeout back instead of
//! repeating the request elsewhere.

use crate::adapters::ReqwestConnector;
use crate::domain::types::{self, AccountBalanceReply, AccountInfoReply, ProcessReply, WorkReply};
use crate::domain::{AccountBalance, TransportConfig, TransportError, TransportState};
use crate::ports::{NodeConnector, NodeRpc};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use shared_types::{
    Account, AccountState, BlockHash, BlockKind, BlockSubtype, PendingBlock, Raw, StateBlock,
    WorkToken,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Whether a request may be repeated after a timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Delivery {
    Idempotent,
    AtMostOnce,
}

/// Connect timeout for the default HTTP connector.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Multi-node RPC client.
pub struct RpcTransport {
    config: TransportConfig,
    connector: Arc<dyn NodeConnector>,
    state: Mutex<TransportState>,
}

impl RpcTransport {
    /// Build a transport over HTTP.
    pub fn new(config: TransportConfig) -> Result<Self, TransportError> {
        let connector = ReqwestConnector::new(CONNECT_TIMEOUT.min(config.request_timeout))?;
        Self::with_connector(config, Arc::new(connector))
    }

    /// Build a transport over any connector.
    pub fn with_connector(
        config: TransportConfig,
        connector: Arc<dyn NodeConnector>,
    ) -> Result<Self, TransportError> {
        config.validate()?;
        let state = TransportState::new(config.resolved_nodes());
        Ok(Self {
            config,
            connector,
            state: Mutex::new(state),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// URL of the node the next call will try first.
    pub fn current_node(&self) -> Option<String> {
        self.state.lock().current().map(|(_, node)| node.url)
    }

    /// Deadline for `work_generate` at the difficulty of `kind`.
    pub fn work_timeout(&self, kind: BlockKind) -> Duration {
        match kind {
            BlockKind::Send => self.config.send_work_timeout,
            BlockKind::Receive => self.config.receive_work_timeout,
        }
    }

    /// Run `action` with the default request timeout.
    pub async fn call(&self, action: &str, params: Value) -> Result<Value, TransportError> {
        self.call_with_timeout(action, params, self.config.request_timeout)
            .await
    }

    /// Run `action`, failing over between nodes.
    ///
    /// At most `attempts_per_node * node_count` requests are sent.
    pub async fn call_with_timeout(
        &self,
        action: &str,
        params: Value,
        timeout: Duration,
    ) -> Result<Value, TransportError> {
        self.dispatch(action, params, timeout, Delivery::Idempotent)
            .await
    }

    /// Run a ledger-changing `action`.
    ///
    /// Rate limits and unreachable nodes fail over as usual. A timeout is
    /// returned as is: the node may already have applied the request.
    pub async fn call_at_most_once(
        &self,
        action: &str,
        params: Value,
    ) -> Result<Value, TransportError> {
        self.dispatch(action, params, self.config.request_timeout, Delivery::AtMostOnce)
            .await
    }

    async fn dispatch(
        &self,
        action: &str,
        params: Value,
        timeout: Duration,
        delivery: Delivery,
    ) -> Result<Value, TransportError> {
        let node_count = self.state.lock().node_count();
        if node_count == 0 {
            return Err(TransportError::NoNodes);
        }
        let max_attempts = self.config.attempts_per_node.max(1) * node_count as u32;
        let mut last_error = None;

        for attempt in 1..=max_attempts {
            let Some((index, node)) = self.state.lock().current() else {
                return Err(TransportError::NoNodes);
            };
            let body = request_body(action, &params, node.api_key.as_deref())?;

            debug!(action, node = %node.url, attempt, "RPC request");
            match self.connector.post(&node, &body, timeout).await {
                Ok(reply) => return check_reply(reply),
                Err(e) if e.is_retryable() => {
                    let next = self.state.lock().rotate_from(index);
                    warn!(
                        action,
                        node = %node.url,
                        attempt,
                        max_attempts,
                        next_node = next,
                        error = %e,
                        "RPC attempt failed, rotating node"
                    );
                    if delivery == Delivery::AtMostOnce && e.is_unconfirmed() {
                        return Err(e);
                    }
                    last_error = Some(e);
                    if attempt < max_attempts {
                        tokio::time::sleep(self.backoff(attempt)).await;
                    }
                }
                Err(e) => return Err(e),
            }
        }

        Err(TransportError::Exhausted {
            action: action.to_string(),
            attempts: max_attempts,
            last: Box::new(last_error.unwrap_or(TransportError::NoNodes)),
        })
    }

    /// Exponential backoff for the pause after `attempt` failed, capped.
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 1u32 << attempt.saturating_sub(1).min(16);
        self.config
            .backoff_base
            .saturating_mul(factor)
            .min(self.config.backoff_max)
    }
}

fn request_body(action: &str, params: &Value, key: Option<&str>) -> Result<Value, TransportError> {
    let mut body = match params {
        Value::Object(map) => map.clone(),
        Value::Null => Map::new(),
        other => {
            return Err(TransportError::InvalidRequest(format!(
                "{action}: params must be an object, got {other}"
            )))
        }
    };
    body.insert("action".to_string(), Value::String(action.to_string()));
    if let Some(key) = key {
        body.insert("key".to_string(), Value::String(key.to_string()));
    }
    Ok(Value::Object(body))
}

fn check_reply(reply: Value) -> Result<Value, TransportError> {
    match reply.get("error") {
        None | Some(Value::Null) => Ok(reply),
        Some(Value::String(message)) => Err(TransportError::Node {
            message: message.clone(),
        }),
        Some(other) => Err(TransportError::Node {
            message: other.to_string(),
        }),
    }
}

#[async_trait]
impl NodeRpc for RpcTransport {
    async fn account_info(&self, account: &Account) -> Result<Option<AccountState>, TransportError> {
        let params = json!({ "account": account, "representative": "true" });
        match self.call("account_info", params).await {
            Ok(reply) => {
                let reply: AccountInfoReply = types::decode("account_info", reply)?;
                Ok(Some(reply.into()))
            }
            Err(e) if e.is_account_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn pending(
        &self,
        account: &Account,
        count: u32,
        threshold: Raw,
    ) -> Result<Vec<PendingBlock>, TransportError> {
        let params = json!({
            "account": account,
            "count": count.to_string(),
            "threshold": threshold,
            "source": "true",
        });
        let reply = self.call("pending", params).await?;
        types::parse_pending(&reply)
    }

    async fn work_generate(
        &self,
        root: &BlockHash,
        kind: BlockKind,
    ) -> Result<WorkToken, TransportError> {
        let params = json!({ "hash": root, "difficulty": kind.threshold_hex() });
        let reply = self
            .call_with_timeout("work_generate", params, self.work_timeout(kind))
            .await?;
        let reply: WorkReply = types::decode("work_generate", reply)?;
        Ok(reply.work)
    }

    async fn process(
        &self,
        block: &StateBlock,
        subtype: BlockSubtype,
    ) -> Result<BlockHash, TransportError> {
        let params = json!({
            "json_block": "true",
            "subtype": subtype.as_str(),
            "block": block,
        });
        let reply = self.call_at_most_once("process", params).await?;
        let reply: ProcessReply = types::decode("process", reply)?;
        Ok(reply.hash)
    }

    async fn account_balance(&self, account: &Account) -> Result<AccountBalance, TransportError> {
        let reply = self
            .call("account_balance", json!({ "account": account }))
            .await?;
        let reply: AccountBalanceReply = types::decode("account_balance", reply)?;
        Ok(reply.into())
    }
}
