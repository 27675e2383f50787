//! Orchestrator configuration.

use serde::{Deserialize, Serialize};
use shared_types::{Account, Raw};
use std::time::Duration;
use thiserror::Error;

/// Orchestrator configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestratorConfig {
    /// Representative for open blocks. When unset an account represents
    /// itself.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_representative: Option<String>,
    /// Pause between draining pending blocks and reading state for a send.
    #[serde(with = "shared_types::humantime_serde")]
    pub settle_delay: Duration,
    /// How many `account_info` reads to wait for a submitted block to show
    /// up as the frontier.
    pub frontier_refresh_attempts: u32,
    /// Delay before the n-th re-read is `n * frontier_refresh_delay`.
    #[serde(with = "shared_types::humantime_serde")]
    pub frontier_refresh_delay: Duration,
    /// `count` for the `pending` action.
    pub pending_count: u32,
    /// Upper bound on `pending` pages drained per call.
    pub pending_pages: u32,
    /// Ignore incoming amounts below this many raw.
    pub pending_threshold: Raw,
    /// Attempts per block when the node reports insufficient work or a
    /// stale previous.
    pub submit_attempts: u32,
    /// Warm the cache for the next block after each submission.
    pub precompute_next: bool,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            default_representative: None,
            settle_delay: Duration::from_millis(1_000),
            frontier_refresh_attempts: 5,
            frontier_refresh_delay: Duration::from_millis(500),
            pending_count: 100,
            pending_pages: 10,
            pending_threshold: Raw::new(1),
            submit_attempts: 3,
            precompute_next: true,
        }
    }
}

impl OrchestratorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.representative()?;
        if self.frontier_refresh_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "frontier_refresh_attempts must be > 0".to_string(),
            ));
        }
        if self.submit_attempts == 0 {
            return Err(ConfigError::InvalidLimit(
                "submit_attempts must be > 0".to_string(),
            ));
        }
        if self.pending_count == 0 {
            return Err(ConfigError::InvalidLimit(
                "pending_count must be > 0".to_string(),
            ));
        }
        if self.pending_pages == 0 {
            return Err(ConfigError::InvalidLimit(
                "pending_pages must be > 0".to_string(),
            ));
        }
        Ok(())
    }

    /// The parsed default representative, if one is configured.
    pub fn representative(&self) -> Result<Option<Account>, ConfigError> {
        self.default_representative
            .as_deref()
            .map(|address| {
                Account::parse(address).map_err(|e| ConfigError::InvalidRepresentative {
                    address: address.to_string(),
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid default representative {address}: {reason}")]
    InvalidRepresentative { address: String, reason: String },
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
}
