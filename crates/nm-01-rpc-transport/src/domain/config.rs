//! Transport configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// One candidate RPC node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeEndpoint {
    pub url: String,
    /// Overrides `TransportConfig::api_key` for this node.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl NodeEndpoint {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
        }
    }

    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }
}

/// Transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportConfig {
    /// Candidate nodes, tried in order and rotated on transient failure.
    pub nodes: Vec<NodeEndpoint>,
    /// Key sent with every request when the node has none of its own.
    /// Public nodes work without one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Timeout for ordinary actions.
    #[serde(with = "shared_types::humantime_serde")]
    pub request_timeout: Duration,
    /// Timeout for `work_generate` at send difficulty.
    #[serde(with = "shared_types::humantime_serde")]
    pub send_work_timeout: Duration,
    /// Timeout for `work_generate` at receive difficulty.
    #[serde(with = "shared_types::humantime_serde")]
    pub receive_work_timeout: Duration,
    /// Total attempts per call = `attempts_per_node * nodes.len()`.
    pub attempts_per_node: u32,
    /// First backoff delay; doubles per attempt.
    #[serde(with = "shared_types::humantime_serde")]
    pub backoff_base: Duration,
    /// Backoff cap.
    #[serde(with = "shared_types::humantime_serde")]
    pub backoff_max: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            nodes: vec![NodeEndpoint::new("https://rpc.nano.to")],
            api_key: None,
            request_timeout: Duration::from_secs(10),
            send_work_timeout: Duration::from_secs(30),
            receive_work_timeout: Duration::from_secs(15),
            attempts_per_node: 2,
            backoff_base: Duration::from_millis(250),
            backoff_max: Duration::from_secs(4),
        }
    }
}

impl TransportConfig {
    /// Config for a single node without a key.
    pub fn single(url: impl Into<String>) -> Self {
        Self {
            nodes: vec![NodeEndpoint::new(url)],
            ..Default::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.nodes.is_empty() {
            return Err(ConfigError::NoNodes);
        }
        for node in &self.nodes {
            if !(node.url.starts_with("http://") || node.url.starts_with("https://")) {
                return Err(ConfigError::InvalidUrl(node.url.clone()));
            }
        }
        if self.attempts_per_node == 0 {
            return Err(ConfigError::InvalidLimit(
                "attempts_per_node must be > 0".to_string(),
            ));
        }
        for (name, value) in [
            ("request_timeout", self.request_timeout),
            ("send_work_timeout", self.send_work_timeout),
            ("receive_work_timeout", self.receive_work_timeout),
        ] {
            if value.is_zero() {
                return Err(ConfigError::InvalidTimeout(format!("{name} must be > 0")));
            }
        }
        if self.backoff_max < self.backoff_base {
            return Err(ConfigError::InvalidTimeout(
                "backoff_max must be >= backoff_base".to_string(),
            ));
        }
        Ok(())
    }

    /// Nodes with the global key filled in where a node has none.
    pub fn resolved_nodes(&self) -> Vec<NodeEndpoint> {
        self.nodes
            .iter()
            .map(|node| NodeEndpoint {
                url: node.url.clone(),
                api_key: node.api_key.clone().or_else(|| self.api_key.clone()),
            })
            .collect()
    }

    /// Parse a comma-separated URL list (as found in `NANO_RPC_URLS`).
    pub fn nodes_from_list(list: &str) -> Vec<NodeEndpoint> {
        list.split(',')
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(NodeEndpoint::new)
            .collect()
    }
}

/// Configuration errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("at least one RPC node must be configured")]
    NoNodes,
    #[error("invalid node URL: {0}")]
    InvalidUrl(String),
    #[error("invalid limit: {0}")]
    InvalidLimit(String),
    #[error("invalid timeout: {0}")]
    InvalidTimeout(String),
}
