//! # Nano Telemetry
//!
//! Structured logging for the Nano MCP services.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use nano_telemetry::{init_logging, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_logging(&config)?;
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `nano-mcp` | Service name in log lines |
//! | `NM_LOG_LEVEL` / `RUST_LOG` | `info` | `EnvFilter` directive |
//! | `NM_JSON_LOGS` | `false` (`true` in containers) | JSON output |
//! | `NM_CONSOLE_OUTPUT` | `true` | Write to stdout |
//! | `NM_LOG_TARGETS` | `true` | Include module targets |

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingGuard};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to install tracing subscriber: {0}")]
    SubscriberInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Subsystem names used in the `subsystem` log field.
pub mod subsystems {
    pub const TRANSPORT: &str = "rpc-transport";
    pub const WORK_CACHE: &str = "work-cache";
    pub const ORCHESTRATOR: &str = "orchestrator";
    pub const GATEWAY: &str = "mcp-gateway";
    pub const COMPUTE: &str = "compute";
}
