//! `nano-mcp`: MCP JSON-RPC server for Nano wallets.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use mcp_runtime::{RuntimeConfig, Services};
use nano_telemetry::{init_logging, TelemetryConfig};
use tracing::{info, warn};

/// Command line flags.
#[derive(Debug, Parser)]
#[command(name = "nano-mcp", version, about)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "NANO_MCP_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, e.g. `debug` or `info,nm_02_work_cache=debug`
    #[arg(long)]
    log_level: Option<String>,

    /// Validate the configuration, print it and exit
    #[arg(long)]
    check_config: bool,
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut telemetry = TelemetryConfig::from_env();
    if let Some(level) = cli.log_level.clone() {
        telemetry = telemetry.with_level(level);
    }
    let _guard = init_logging(&telemetry).context("failed to initialize logging")?;

    let config = RuntimeConfig::load(cli.config.as_deref()).context("invalid configuration")?;

    if cli.check_config {
        let rendered = toml::to_string_pretty(&config).context("failed to render configuration")?;
        println!("{rendered}");
        return Ok(());
    }

    info!("===========================================");
    info!("  Nano MCP v{}", env!("CARGO_PKG_VERSION"));
    info!("===========================================");
    info!(
        nodes = config.transport.nodes.len(),
        work_source = ?config.work.source,
        addr = %config.gateway.http_addr(),
        "Starting"
    );

    let services = Services::assemble(&config)?;
    services.run(&config, shutdown_signal()).await?;

    info!("Shutdown complete");
    Ok(())
}
