//! Ports layer for the RPC transport.
//!
//! - Inbound: `NodeRpc`, the typed node actions the orchestrators call
//! - Outbound: `NodeConnector`, one HTTP POST against one node

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
