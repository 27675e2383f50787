//! Read-only ledger tools and local conversions.

use crate::domain::error::{ApiError, ApiResult};
use nm_01_rpc_transport::NodeRpc;
use serde_json::{json, Value};
use shared_types::{Account, Raw};
use std::sync::Arc;
use tracing::instrument;

/// Default `count` for getPendingBlocks
pub const DEFAULT_PENDING_COUNT: u32 = 100;
const MAX_PENDING_COUNT: u32 = 1000;

fn parse_address(address: &str) -> ApiResult<Account> {
    Account::parse(address.trim())
        .map_err(|e| ApiError::invalid_params(format!("invalid address {}: {}", address, e)))
}

/// Raw amount with its XNO rendering.
fn amount_json(raw: Raw) -> Value {
    json!({ "raw": raw.to_string(), "nano": raw.to_decimal() })
}

/// Ledger reads handler
pub struct LedgerRpc {
    node: Arc<dyn NodeRpc>,
}

impl LedgerRpc {
    pub fn new(node: Arc<dyn NodeRpc>) -> Self {
        Self { node }
    }

    /// getBalance
    #[instrument(skip(self))]
    pub async fn get_balance(&self, address: &str) -> ApiResult<Value> {
        let account = parse_address(address)?;
        let balance = self.node.account_balance(&account).await?;
        Ok(json!({
            "address": account,
            "balance": amount_json(balance.balance),
            "pending": amount_json(balance.receivable),
        }))
    }

    /// getAccountInfo. An unopened account is reported, not an error.
    #[instrument(skip(self))]
    pub async fn get_account_info(&self, address: &str) -> ApiResult<Value> {
        let account = parse_address(address)?;
        let info = match self.node.account_info(&account).await? {
            Some(state) => json!({
                "address": account,
                "opened": true,
                "frontier": state.frontier,
                "balance": amount_json(state.balance),
                "representative": state.representative,
                "blockCount": state.block_count,
            }),
            None => json!({
                "address": account,
                "opened": false,
                "balance": amount_json(Raw::ZERO),
                "blockCount": 0,
            }),
        };
        Ok(info)
    }

    /// getPendingBlocks
    #[instrument(skip(self))]
    pub async fn get_pending_blocks(&self, address: &str, count: Option<u32>) -> ApiResult<Value> {
        let account = parse_address(address)?;
        let count = count.unwrap_or(DEFAULT_PENDING_COUNT);
        if count == 0 || count > MAX_PENDING_COUNT {
            return Err(ApiError::invalid_params(format!(
                "count must be between 1 and {}",
                MAX_PENDING_COUNT
            )));
        }
        let blocks = self.node.pending(&account, count, Raw::new(1)).await?;
        let total = blocks
            .iter()
            .fold(Raw::ZERO, |sum, b| sum.checked_add(b.amount).unwrap_or(sum));
        let entries: Vec<Value> = blocks
            .iter()
            .map(|b| {
                json!({
                    "hash": b.hash,
                    "amount": amount_json(b.amount),
                    "source": b.source,
                })
            })
            .collect();
        Ok(json!({
            "address": account,
            "count": entries.len(),
            "total": amount_json(total),
            "blocks": entries,
        }))
    }

    /// validateAddress
    pub fn validate_address(&self, address: &str) -> Value {
        match Account::parse(address.trim()) {
            Ok(account) => json!({
                "address": address,
                "valid": true,
                "publicKey": account.public_key(),
            }),
            Err(e) => json!({
                "address": address,
                "valid": false,
                "reason": e.to_string(),
            }),
        }
    }

    /// convertBalance. Exact in both directions; more than 30 decimal
    /// places is an error rather than a rounding.
    pub fn convert_balance(&self, amount: &str, from: &str) -> ApiResult<Value> {
        let parsed = match from.to_ascii_lowercase().as_str() {
            "raw" => amount.trim().parse::<Raw>(),
            "nano" | "xno" => Raw::from_decimal(amount),
            other => {
                return Err(ApiError::invalid_params(format!(
                    "from must be \"raw\" or \"nano\", got {:?}",
                    other
                )))
            }
        };
        let raw = parsed.map_err(|e| ApiError::invalid_params(format!("amount: {}", e)))?;
        Ok(amount_json(raw))
    }
}
