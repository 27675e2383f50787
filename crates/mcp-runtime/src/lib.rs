//! # Nano MCP Runtime
//!
//! Builds the service graph from a [`RuntimeConfig`] and runs it.
//!
//! ## Startup Sequence
//!
//! 1. Parse CLI flags, initialize logging
//! 2. Load the TOML file (if any), apply environment overrides, validate
//! 3. Build the RPC transport and the configured work generator
//! 4. Build the work cache and spawn its sweep task
//! 5. Build the orchestrator and the gateway
//! 6. Serve until Ctrl-C

pub mod config;
pub mod wiring;

pub use config::{RuntimeConfig, RuntimeConfigError};
pub use wiring::Services;
