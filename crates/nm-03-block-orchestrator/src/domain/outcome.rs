//! Results of orchestrated operations.

use super::error::OperationError;
use serde::Serialize;
use shared_types::{Account, BlockHash, BlockSubtype, Raw};

/// A pending block that was received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceivedBlock {
    /// The send block that was pending.
    pub pending_hash: BlockHash,
    /// The new receive/open block.
    pub hash: BlockHash,
    pub previous: BlockHash,
    pub amount: Raw,
    pub subtype: BlockSubtype,
    /// Balance after this block.
    pub balance: Raw,
}

/// Result for one pending block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReceiveOutcome {
    Received(ReceivedBlock),
    #[serde(rename_all = "camelCase")]
    Failed {
        pending_hash: BlockHash,
        amount: Raw,
        error: OperationError,
    },
}

impl ReceiveOutcome {
    pub fn is_received(&self) -> bool {
        matches!(self, ReceiveOutcome::Received(_))
    }

    pub fn pending_hash(&self) -> BlockHash {
        match self {
            ReceiveOutcome::Received(block) => block.pending_hash,
            ReceiveOutcome::Failed { pending_hash, .. } => *pending_hash,
        }
    }
}

/// Per-block results of `receive_all_pending`, in processing order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiveReport {
    pub account: Account,
    pub outcomes: Vec<ReceiveOutcome>,
    /// Balance after the last successful block.
    pub final_balance: Raw,
    /// Frontier after the last successful block; zero if still unopened.
    pub frontier: BlockHash,
}

impl ReceiveReport {
    pub fn received_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_received()).count()
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.len() - self.received_count()
    }

    /// Sum of the amounts actually received.
    pub fn total_received(&self) -> Raw {
        self.outcomes
            .iter()
            .filter_map(|o| match o {
                ReceiveOutcome::Received(block) => Some(block.amount),
                ReceiveOutcome::Failed { .. } => None,
            })
            .fold(Raw::ZERO, |sum, amount| {
                sum.checked_add(amount).unwrap_or(Raw::new(u128::MAX))
            })
    }
}

/// A published send block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendReceipt {
    pub hash: BlockHash,
    pub from: Account,
    pub to: Account,
    pub amount: Raw,
    pub previous_balance: Raw,
    pub new_balance: Raw,
    /// Pending blocks received before sending.
    pub received_first: usize,
}

/// `sendTransaction` result as agents see it: `success` plus either the
/// receipt fields or an `error` object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendResult {
    pub success: bool,
    #[serde(flatten, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<SendReceipt>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<OperationError>,
}

impl From<Result<SendReceipt, OperationError>> for SendResult {
    fn from(result: Result<SendReceipt, OperationError>) -> Self {
        match result {
            Ok(receipt) => SendResult {
                success: true,
                receipt: Some(receipt),
                error: None,
            },
            Err(error) => SendResult {
                success: false,
                receipt: None,
                error: Some(error),
            },
        }
    }
}

/// Snapshot for `getAccountStatus`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountStatus {
    pub account: Account,
    pub opened: bool,
    pub balance: Raw,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frontier: Option<BlockHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub representative: Option<Account>,
    pub block_count: u64,
    pub pending_count: usize,
    pub pending_total: Raw,
    /// Pending funds exist and should be received before sending.
    pub needs_receive: bool,
    /// Work for the next block is already cached.
    pub work_ready: bool,
}

/// Result of `initialize_account`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    pub account: Account,
    pub already_opened: bool,
    pub opened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report: Option<ReceiveReport>,
}

/// Result of `warm_work`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WarmResult {
    pub account: Account,
    pub root: BlockHash,
    pub kind: shared_types::BlockKind,
    pub cached: bool,
}
