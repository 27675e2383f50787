//! Telemetry configuration from environment variables.

use std::env;

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error) or a full
    /// `EnvFilter` directive such as `info,nm_02_work_cache=debug`
    pub log_level: String,

    /// Whether to enable console output
    pub console_output: bool,

    /// Whether to emit JSON lines instead of human-readable output
    pub json_logs: bool,

    /// Include module targets in output
    pub with_targets: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "nano-mcp".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
            with_targets: true,
        }
    }
}

fn flag(name: &str) -> Option<bool> {
    env::var(name)
        .ok()
        .map(|v| matches!(v.to_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `OTEL_SERVICE_NAME`: Service name (default: nano-mcp)
    /// - `NM_LOG_LEVEL` or `RUST_LOG`: Log filter (default: info)
    /// - `NM_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `NM_JSON_LOGS`: JSON output (default: false, true inside containers)
    /// - `NM_LOG_TARGETS`: Include targets (default: true)
    pub fn from_env() -> Self {
        let is_container =
            env::var("KUBERNETES_SERVICE_HOST").is_ok() || env::var("DOCKER_CONTAINER").is_ok();

        Self {
            service_name: env::var("OTEL_SERVICE_NAME").unwrap_or_else(|_| "nano-mcp".to_string()),

            log_level: env::var("NM_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: flag("NM_CONSOLE_OUTPUT").unwrap_or(true),

            json_logs: flag("NM_JSON_LOGS").unwrap_or(is_container),

            with_targets: flag("NM_LOG_TARGETS").unwrap_or(true),
        }
    }

    /// Override the level, e.g. from a `--log-level` flag.
    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }
}
