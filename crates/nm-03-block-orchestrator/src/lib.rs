//! # NM-03 Block Orchestrator
//!
//! Turns "receive everything" and "send this amount" into correctly chained
//! state blocks.
//!
//! **Architecture:** Hexagonal (ports and adapters). The node is reached
//! through `NodeRpc` (nm-01), work through the shared `WorkCache` (nm-02).
//!
//! ## Operations
//!
//! | Operation | Summary |
//! |-----------|---------|
//! | `receive_all_pending(address, key)` | one open/receive block per pending send, strictly in sequence |
//! | `send_transaction(from, to, amount, key)` | drain pending, check balance, publish one send block |
//! | `account_status(address)` | balance, frontier and pending summary |
//! | `warm_work(address)` | precompute work for the next block |
//! | `initialize_account(address, key)` | open an unopened account |
//!
//! ## Block step
//!
//! ```text
//! account_info ─► draft ─► obtain work ─► sign ─► process ─► invalidate
//!      ▲                                             │
//!      └──── insufficient work / stale frontier ─────┘ (bounded)
//! ```
//!
//! The signer receives the balance before the block and a credit or debit;
//! it computes the new balance itself. After each accepted block the
//! orchestrator waits for the node to report the new hash as the frontier
//! before building on it.
//!
//! ## Failure reporting
//!
//! Precondition failures (bad address, key that does not own the address,
//! zero amount, insufficient balance) are returned before any work is
//! requested. In `receive_all_pending` each pending block gets its own
//! outcome; one failure never stops the rest.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    classify_rejection, AccountStatus, ConfigError, InitializeResult, OperationError,
    OrchestratorConfig, ReceiveOutcome, ReceiveReport, ReceivedBlock, Rejection, SendReceipt,
    SendResult, WarmResult,
};
pub use ports::BlockOrchestratorApi;
pub use service::BlockOrchestrator;
