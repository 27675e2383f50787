//! Ledger entities as seen from the client side.

use crate::account::Account;
use crate::amount::Raw;
use crate::hash::{BlockHash, Link, Signature};
use crate::work::WorkToken;
use serde::{Deserialize, Serialize};

/// Snapshot of an account, read in one `account_info` round trip.
///
/// `frontier` and `balance` always come from the same response; never mix a
/// frontier from one read with a balance from another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountState {
    /// Latest block, or `BlockHash::ZERO` for an unopened account.
    pub frontier: BlockHash,
    pub balance: Raw,
    pub representative: Option<Account>,
    pub block_count: u64,
}

impl AccountState {
    /// State of an account that has never been opened.
    pub fn unopened() -> Self {
        Self {
            frontier: BlockHash::ZERO,
            balance: Raw::ZERO,
            representative: None,
            block_count: 0,
        }
    }

    pub fn is_opened(&self) -> bool {
        !self.frontier.is_zero()
    }
}

/// An incoming transfer waiting to be received.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingBlock {
    /// Hash of the send block on the sender's chain.
    pub hash: BlockHash,
    pub amount: Raw,
    pub source: Option<Account>,
}

/// A signed state block in the JSON shape `process` accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateBlock {
    #[serde(rename = "type")]
    pub block_type: String,
    pub account: Account,
    pub previous: BlockHash,
    pub representative: Account,
    /// Balance after this block is applied.
    pub balance: Raw,
    pub link: Link,
    pub signature: Signature,
    pub work: WorkToken,
}

impl StateBlock {
    pub const TYPE: &'static str = "state";
}
