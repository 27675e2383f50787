//! # Runtime Configuration
//!
//! One TOML document with a table per subsystem. Every table is optional;
//! missing keys take their defaults. Environment variables override the
//! file:
//!
//! | Variable | Overrides |
//! |----------|-----------|
//! | `NANO_RPC_URLS` | `transport.nodes` (comma-separated) |
//! | `NANO_RPC_KEY` | `transport.api_key` |
//! | `NANO_DEFAULT_REPRESENTATIVE` | `orchestrator.default_representative` |
//! | `NANO_WORK_SOURCE` | `work.source` (`node`, `local`, `node_with_local_fallback`) |
//! | `MCP_HOST` | `gateway.http.host` |
//! | `MCP_PORT` | `gateway.http.port` |

use nm_01_rpc_transport::TransportConfig;
use nm_02_work_cache::{WorkCacheConfig, WorkSettings, WorkSource};
use nm_03_block_orchestrator::OrchestratorConfig;
use nm_04_mcp_gateway::GatewayConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;
use tracing::info;

/// Complete runtime configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub transport: TransportConfig,
    pub work_cache: WorkCacheConfig,
    pub work: WorkSettings,
    pub orchestrator: OrchestratorConfig,
    pub gateway: GatewayConfig,
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum RuntimeConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },

    #[error("invalid {var}: {reason}")]
    Env { var: &'static str, reason: String },

    #[error("transport: {0}")]
    Transport(#[from] nm_01_rpc_transport::ConfigError),

    #[error("work cache: {0}")]
    WorkCache(#[from] nm_02_work_cache::ConfigError),

    #[error("orchestrator: {0}")]
    Orchestrator(#[from] nm_03_block_orchestrator::ConfigError),

    #[error("gateway: {0}")]
    Gateway(#[from] nm_04_mcp_gateway::ConfigError),
}

impl RuntimeConfig {
    /// Parse a TOML document.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, RuntimeConfigError> {
        toml::from_str(text).map_err(|source| RuntimeConfigError::Parse {
            path: origin.to_string(),
            source,
        })
    }

    /// Read a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, RuntimeConfigError> {
        let display = path.display().to_string();
        let text = std::fs::read_to_string(path).map_err(|source| RuntimeConfigError::Read {
            path: display.clone(),
            source,
        })?;
        Self::from_toml(&text, &display)
    }

    /// Load from an optional file, apply the process environment, validate.
    pub fn load(path: Option<&Path>) -> Result<Self, RuntimeConfigError> {
        let mut config = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                Self::from_file(path)?
            }
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Apply overrides from `lookup` (the process environment in
    /// production).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), RuntimeConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(urls) = lookup("NANO_RPC_URLS") {
            let nodes = TransportConfig::nodes_from_list(&urls);
            if nodes.is_empty() {
                return Err(RuntimeConfigError::Env {
                    var: "NANO_RPC_URLS",
                    reason: "no URLs given".to_string(),
                });
            }
            self.transport.nodes = nodes;
        }
        if let Some(key) = lookup("NANO_RPC_KEY").filter(|k| !k.trim().is_empty()) {
            self.transport.api_key = Some(key.trim().to_string());
        }
        if let Some(rep) = lookup("NANO_DEFAULT_REPRESENTATIVE").filter(|r| !r.trim().is_empty())
        {
            self.orchestrator.default_representative = Some(rep.trim().to_string());
        }
        if let Some(source) = lookup("NANO_WORK_SOURCE") {
            self.work.source =
                source
                    .parse::<WorkSource>()
                    .map_err(|e| RuntimeConfigError::Env {
                        var: "NANO_WORK_SOURCE",
                        reason: e.to_string(),
                    })?;
        }
        if let Some(host) = lookup("MCP_HOST") {
            self.gateway.http.host = host.trim().parse().map_err(|_| RuntimeConfigError::Env {
                var: "MCP_HOST",
                reason: format!("{host:?} is not an IP address"),
            })?;
        }
        if let Some(port) = lookup("MCP_PORT") {
            self.gateway.http.port = port.trim().parse().map_err(|_| RuntimeConfigError::Env {
                var: "MCP_PORT",
                reason: format!("{port:?} is not a port number"),
            })?;
        }
        Ok(())
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), RuntimeConfigError> {
        self.transport.validate()?;
        self.work_cache.validate()?;
        self.work.validate()?;
        self.orchestrator.validate()?;
        self.gateway.validate()?;
        Ok(())
    }
}
