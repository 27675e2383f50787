//! NM-04 MCP Gateway - JSON-RPC 2.0 facade over the Nano orchestrators.
//!
//! Agents speak MCP (`initialize`, `tools/list`, `tools/call`); scripts may
//! call the same tools directly by method name.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────┐
//! │                    MCP GATEWAY (nm-04)                     │
//! ├───────────────────────────────────────────────────────────┤
//! │   POST /  (JSON-RPC, batches)        GET /health          │
//! │         │                                                 │
//! │   CORS → Trace → Timeout → Body limit                     │
//! │         │                                                 │
//! │   process_single_request ─► route_method                  │
//! │         │                        │                        │
//! │   ┌─────┴──────┐          ┌──────┴───────┐                │
//! │   │ LedgerRpc  │          │  WalletRpc   │                │
//! │   └─────┬──────┘          └──────┬───────┘                │
//! └─────────┼────────────────────────┼────────────────────────┘
//!           ▼                        ▼
//!     NodeRpc (nm-01)     BlockOrchestratorApi (nm-03)
//!                          + WorkCache (nm-02)
//! ```
//!
//! # Errors
//!
//! Bad input is `-32602` with the tagged operation error in `data`;
//! operation failures are `-32000`, node outages `-32002`. A failed
//! `sendTransaction` is not an error: it returns `{"success": false, ...}`.
//!
//! # Usage
//!
//! ```ignore
//! use nm_04_mcp_gateway::{GatewayConfig, McpGatewayService, McpHandlers};
//!
//! let handlers = McpHandlers::new(node, orchestrator, cache);
//! let service = McpGatewayService::new(GatewayConfig::default(), handlers)?;
//! service.serve(shutdown_signal()).await?;
//! ```
//!
//! The server binds to localhost by default. Write tools take private keys
//! in their parameters, so expose it only behind something you trust.

pub mod domain;
pub mod middleware;
pub mod router;
pub mod rpc;
pub mod service;


pub use domain::{
    codes, get_method_info, is_method_supported, tool_list, ApiError, ApiResult, ConfigError,
    CorsConfig, GatewayConfig, GatewayError, HttpConfig, LimitsConfig, MethodInfo, ParamInfo,
    Params, TimeoutConfig, METHODS,
};
pub use middleware::GatewayMetrics;
pub use router::{call_tool, route_method, PROTOCOL_VERSION};
pub use rpc::McpHandlers;
pub use service::McpGatewayService;
