//! Operation errors.
//!
//! One variant per failure kind, each carrying the context an agent needs
//! to decide what to do next. Serialized with a `kind` tag:
//!
//! ```json
//! {"kind": "insufficient_balance", "account": "nano_...", "current": "10",
//!  "requested": "25", "shortfall": "15"}
//! ```

use nm_01_rpc_transport::TransportError;
use nm_02_work_cache::WorkError;
use serde::Serialize;
use shared_types::{BlockHash, BlockKind, BlockSubtype, Raw};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OperationError {
    #[error("invalid {field} address {address:?}: {reason}")]
    InvalidAddress {
        field: String,
        address: String,
        reason: String,
    },

    #[error("private key must be 64 hex characters")]
    InvalidPrivateKey,

    #[error("private key belongs to {derived}, not {address}")]
    KeyMismatch { address: String, derived: String },

    #[error("invalid amount {amount:?}: {reason}")]
    InvalidAmount { amount: String, reason: String },

    #[error("{account} has {current} raw, {requested} requested ({shortfall} short)")]
    InsufficientBalance {
        account: String,
        current: Raw,
        requested: Raw,
        shortfall: Raw,
    },

    #[error("account {account} is not opened and has nothing pending to open it with")]
    AccountNotInitialized { account: String },

    /// The node's frontier did not match what the operation built on.
    #[error("frontier of {account} is stale after {attempts} attempts (expected {expected})")]
    StaleFrontier {
        account: String,
        expected: BlockHash,
        observed: Option<BlockHash>,
        attempts: u32,
    },

    #[error("node rejected work for {account} on {root} after {attempts} attempts")]
    InsufficientWork {
        account: String,
        root: BlockHash,
        attempts: u32,
    },

    #[error("{block_kind} work generation timed out after {elapsed_ms}ms")]
    WorkTimeout {
        block_kind: BlockKind,
        elapsed_ms: u64,
    },

    #[error("work generation failed: {reason}")]
    WorkFailed { reason: String, retryable: bool },

    #[error("node request failed: {reason}")]
    Transport { reason: String, retryable: bool },

    /// No reply to `process` after resending the same block; it may or may
    /// not be on the ledger. Check the frontier before repeating.
    #[error("publishing {hash} for {account} unconfirmed after {attempts} attempts: {reason}")]
    PublishUnconfirmed {
        account: String,
        hash: BlockHash,
        attempts: u32,
        reason: String,
    },

    /// Any other rejection from `process`.
    #[error("{subtype} block for {account} rejected: {message}")]
    BlockRejected {
        account: String,
        subtype: BlockSubtype,
        amount: Raw,
        balance: Raw,
        message: String,
    },

    #[error("receiving {amount} raw would overflow the balance {balance} of {account}")]
    BalanceOverflow {
        account: String,
        balance: Raw,
        amount: Raw,
    },

    #[error("signing failed: {reason}")]
    Signing { reason: String },
}

impl OperationError {
    /// Whether repeating the whole operation later may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            OperationError::StaleFrontier { .. }
            | OperationError::InsufficientWork { .. }
            | OperationError::WorkTimeout { .. } => true,
            OperationError::WorkFailed { retryable, .. }
            | OperationError::Transport { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Detected locally, before any work or submission.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            OperationError::InvalidAddress { .. }
                | OperationError::InvalidPrivateKey
                | OperationError::KeyMismatch { .. }
                | OperationError::InvalidAmount { .. }
                | OperationError::InsufficientBalance { .. }
                | OperationError::AccountNotInitialized { .. }
        )
    }

    /// Stable snake_case name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            OperationError::InvalidAddress { .. } => "invalid_address",
            OperationError::InvalidPrivateKey => "invalid_private_key",
            OperationError::KeyMismatch { .. } => "key_mismatch",
            OperationError::InvalidAmount { .. } => "invalid_amount",
            OperationError::InsufficientBalance { .. } => "insufficient_balance",
            OperationError::AccountNotInitialized { .. } => "account_not_initialized",
            OperationError::StaleFrontier { .. } => "stale_frontier",
            OperationError::InsufficientWork { .. } => "insufficient_work",
            OperationError::WorkTimeout { .. } => "work_timeout",
            OperationError::WorkFailed { .. } => "work_failed",
            OperationError::Transport { .. } => "transport",
            OperationError::PublishUnconfirmed { .. } => "publish_unconfirmed",
            OperationError::BlockRejected { .. } => "block_rejected",
            OperationError::BalanceOverflow { .. } => "balance_overflow",
            OperationError::Signing { .. } => "signing",
        }
    }
}

impl From<TransportError> for OperationError {
    fn from(error: TransportError) -> Self {
        OperationError::Transport {
            retryable: error.is_transient(),
            reason: error.to_string(),
        }
    }
}

impl From<WorkError> for OperationError {
    fn from(error: WorkError) -> Self {
        match error {
            WorkError::Timeout { kind, elapsed_ms } => OperationError::WorkTimeout {
                block_kind: kind,
                elapsed_ms,
            },
            other => OperationError::WorkFailed {
                retryable: other.is_retryable(),
                reason: other.to_string(),
            },
        }
    }
}
