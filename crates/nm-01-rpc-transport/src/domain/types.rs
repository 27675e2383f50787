//! Reply shapes of the node actions and their conversion into ledger types.

use super::error::TransportError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use shared_types::{Account, AccountState, BlockHash, PendingBlock, Raw, WorkToken};

/// `account_info` reply.
#[derive(Debug, Deserialize)]
pub(crate) struct AccountInfoReply {
    pub frontier: BlockHash,
    pub balance: Raw,
    #[serde(default)]
    pub representative: Option<Account>,
    #[serde(default, deserialize_with = "u64_from_string_or_number")]
    pub block_count: u64,
}

impl From<AccountInfoReply> for AccountState {
    fn from(reply: AccountInfoReply) -> Self {
        AccountState {
            frontier: reply.frontier,
            balance: reply.balance,
            representative: reply.representative,
            block_count: reply.block_count,
        }
    }
}

/// `work_generate` reply.
#[derive(Debug, Deserialize)]
pub(crate) struct WorkReply {
    pub work: WorkToken,
}

/// `process` reply.
#[derive(Debug, Deserialize)]
pub(crate) struct ProcessReply {
    pub hash: BlockHash,
}

#[derive(Debug, Deserialize)]
pub(crate) struct AccountBalanceReply {
    pub balance: Raw,
    #[serde(default)]
    pub pending: Option<Raw>,
    #[serde(default)]
    pub receivable: Option<Raw>,
}

/// Confirmed balance plus the sum of incoming transfers not yet received.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub balance: Raw,
    pub receivable: Raw,
}

impl From<AccountBalanceReply> for AccountBalance {
    fn from(reply: AccountBalanceReply) -> Self {
        AccountBalance {
            balance: reply.balance,
            // newer nodes send both names with the same value
            receivable: reply.receivable.or(reply.pending).unwrap_or(Raw::ZERO),
        }
    }
}

fn u64_from_string_or_number<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => s.parse().map_err(serde::de::Error::custom),
        Value::Number(n) => n
            .as_u64()
            .ok_or_else(|| serde::de::Error::custom("block_count out of range")),
        other => Err(serde::de::Error::custom(format!(
            "unexpected block_count: {other}"
        ))),
    }
}

/// Decode a typed reply, mapping serde failures to `InvalidResponse`.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    action: &str,
    reply: Value,
) -> Result<T, TransportError> {
    serde_json::from_value(reply)
        .map_err(|e| TransportError::InvalidResponse(format!("{action}: {e}")))
}

/// Decode a `pending` reply.
///
/// The node answers `"blocks": ""` when nothing is pending, an object of
/// `hash -> {amount, source}` when `source=true`, and `hash -> amount`
/// without it.
pub fn parse_pending(reply: &Value) -> Result<Vec<PendingBlock>, TransportError> {
    let blocks = match reply.get("blocks") {
        None | Some(Value::Null) => return Ok(Vec::new()),
        Some(Value::String(s)) if s.is_empty() => return Ok(Vec::new()),
        Some(Value::Object(map)) => map,
        Some(other) => {
            return Err(TransportError::InvalidResponse(format!(
                "pending: unexpected blocks value {other}"
            )))
        }
    };

    blocks
        .iter()
        .map(|(hash, entry)| {
            let hash = BlockHash::from_hex(hash)
                .map_err(|e| TransportError::InvalidResponse(format!("pending hash: {e}")))?;
            let (amount, source) = match entry {
                Value::String(amount) => (amount.as_str(), None),
                Value::Object(fields) => {
                    let amount = fields.get("amount").and_then(Value::as_str).ok_or_else(|| {
                        TransportError::InvalidResponse(format!("pending {hash}: missing amount"))
                    })?;
                    let source = match fields.get("source").and_then(Value::as_str) {
                        Some(s) => Some(Account::parse(s).map_err(|e| {
                            TransportError::InvalidResponse(format!("pending {hash} source: {e}"))
                        })?),
                        None => None,
                    };
                    (amount, source)
                }
                other => {
                    return Err(TransportError::InvalidResponse(format!(
                        "pending {hash}: unexpected entry {other}"
                    )))
                }
            };
            let amount: Raw = amount
                .parse()
                .map_err(|e| TransportError::InvalidResponse(format!("pending {hash} amount: {e}")))?;
            Ok(PendingBlock {
                hash,
                amount,
                source,
            })
        })
        .collect()
}
