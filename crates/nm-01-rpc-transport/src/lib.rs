//! # NM-01 RPC Transport
//!
//! Typed access to a Nano node's JSON RPC, with failover across several
//! nodes.
//!
//! **Architecture:** Hexagonal (ports and adapters)
//!
//! ## Failover policy
//!
//! | Failure | Behaviour |
//! |---------|-----------|
//! | HTTP 429 | rotate to the next node, back off, retry |
//! | connect failure | rotate, back off, retry |
//! | timeout | rotate, back off, retry |
//! | other non-2xx | returned immediately |
//! | `{"error": ...}` in the body | returned immediately as `TransportError::Node` |
//!
//! A call sends at most `attempts_per_node * nodes.len()` requests, then
//! fails with `TransportError::Exhausted`. The rotation index lives in a
//! `TransportState` owned by the transport instance, so independently
//! configured transports never share failover state.
//!
//! ## Authentication
//!
//! When a key is configured (globally or per node) it is sent both as the
//! `Authorization` header and as a `key` field in the body. No key is a
//! valid configuration for public nodes.
//!
//! ## Module Structure
//!
//! ```text
//! nm-01-rpc-transport/
//! ├── domain/     # TransportConfig, TransportState, TransportError, reply shapes
//! ├── ports/      # NodeRpc (inbound), NodeConnector (outbound)
//! ├── adapters/   # ReqwestConnector
//! └── service.rs  # RpcTransport
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::ReqwestConnector;
pub use domain::{
    parse_pending, AccountBalance, ConfigError, NodeEndpoint, TransportConfig, TransportError,
    TransportState,
};
pub use ports::{NodeConnector, NodeRpc};
pub use service::RpcTransport;
