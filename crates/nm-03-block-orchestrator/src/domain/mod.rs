//! Domain layer: configuration, results, errors, rejection rules.

pub mod config;
pub mod error;
pub mod outcome;
pub mod rejection;

pub use config::{ConfigError, OrchestratorConfig};
pub use error::OperationError;
pub use outcome::{
    AccountStatus, InitializeResult, ReceiveOutcome, ReceiveReport, ReceivedBlock, SendReceipt,
    SendResult, WarmResult,
};
pub use rejection::{classify_rejection, Rejection};
