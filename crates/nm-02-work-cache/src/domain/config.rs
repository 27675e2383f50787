//! Cache and work-source configuration.

use serde::{Deserialize, Serialize};
use shared_types::BlockKind;
use std::time::Duration;
use thiserror::Error;

/// Work cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkCacheConfig {
    /// When false every request generates work synchronously.
    pub enabled: bool,
    /// Maximum number of entries; the oldest is evicted past this.
    pub capacity: usize,
    /// Lifetime of a precomputed entry.
    #[serde(with = "shared_types::humantime_serde")]
    pub ttl: Duration,
    /// Period of the background sweep.
    #[serde(with = "shared_types::humantime_serde")]
    pub sweep_interval: Duration,
}

impl Default for WorkCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
            ttl: Duration::from_secs(300),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl WorkCacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity == 0 {
            return Err(ConfigError::InvalidLimit("capacity must be > 0".to_string()));
        }
        if self.ttl.is_zero() {
            return Err(ConfigError::InvalidTimeout("ttl must be > 0".to_string()));
        }
        if self.sweep_interval.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "sweep_interval must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where work comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkSource {
    /// The node's `work_generate`.
    Node,
    /// Local CPU search.
    Local,
    /// Node first, local search when the node fails.
    NodeWithLocalFallback,
}

/// Work generation settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorkSettings {
    pub source: WorkSource,
    /// Deadline for generating send-difficulty work.
    #[serde(with = "shared_types::humantime_serde")]
    pub send_timeout: Duration,
    /// Deadline for generating receive-difficulty work.
    #[serde(with = "shared_types::humantime_serde")]
    pub receive_timeout: Duration,
    /// Check node-generated work against the threshold before using it.
    pub validate_node_work: bool,
}

impl Default for WorkSettings {
    fn default() -> Self {
        Self {
            source: WorkSource::NodeWithLocalFallback,
            send_timeout: Duration::from_secs(30),
            receive_timeout: Duration::from_secs(15),
            validate_node_work: true,
        }
    }
}

impl WorkSettings {
    pub fn timeout_for(&self, kind: BlockKind) -> Duration {
        match kind {
            BlockKind::Send => self.send_timeout,
            BlockKind::Receive => self.receive_timeout,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.send_timeout.is_zero() || self.receive_timeout.is_zero() {
            return Err(ConfigError::InvalidTimeout(
                "work timeouts must be > 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl std::str::FromStr for WorkSource {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "node" => Ok(WorkSource::Node),
            "local" => Ok(WorkSource::Local),
            "node_with_local_fallback" | "fallback" => Ok(WorkSource::NodeWithLocalFallback),
            other => Err(ConfigError::Invalid(format!("unknown work source: {other}"))),
        }
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
