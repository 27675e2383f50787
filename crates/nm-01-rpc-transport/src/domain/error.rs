//! Transport error types.

use super::config::ConfigError;
use thiserror::Error;

/// Errors surfaced by the RPC transport.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransportError {
    /// The node did not answer within the timeout.
    #[error("request to {node} timed out after {elapsed_ms}ms")]
    Timeout { node: String, elapsed_ms: u64 },

    /// HTTP 429.
    #[error("node {node} rate limited the request")]
    RateLimited { node: String },

    /// Connection refused, DNS failure, TLS failure.
    #[error("node {node} unreachable: {reason}")]
    Unreachable { node: String, reason: String },

    /// Any other non-2xx status.
    #[error("node {node} returned HTTP {status}")]
    HttpStatus { node: String, status: u16 },

    /// The reply carried an `error` field.
    #[error("node error: {message}")]
    Node { message: String },

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Every attempt failed with a retryable error.
    #[error("{action} failed after {attempts} attempts: {last}")]
    Exhausted {
        action: String,
        attempts: u32,
        last: Box<TransportError>,
    },

    #[error("no RPC nodes configured")]
    NoNodes,

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl TransportError {
    /// Whether the same call may succeed on another node or after a pause.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TransportError::Timeout { .. }
                | TransportError::RateLimited { .. }
                | TransportError::Unreachable { .. }
        )
    }

    /// Transient failures, including ones that already exhausted retries.
    pub fn is_transient(&self) -> bool {
        self.is_retryable() || matches!(self, TransportError::Exhausted { .. })
    }

    /// No reply arrived, so the node may or may not have acted on the
    /// request.
    pub fn is_unconfirmed(&self) -> bool {
        match self {
            TransportError::Timeout { .. } => true,
            TransportError::Exhausted { last, .. } => last.is_unconfirmed(),
            _ => false,
        }
    }

    /// The node's answer for an account with no blocks.
    pub fn is_account_not_found(&self) -> bool {
        matches!(self, TransportError::Node { message } if message.contains("Account not found"))
    }

    /// Error text reported by the node, if any.
    pub fn node_message(&self) -> Option<&str> {
        match self {
            TransportError::Node { message } => Some(message),
            _ => None,
        }
    }
}
