//! Domain layer: configuration, failover state, errors and reply shapes.

pub mod config;
pub mod error;
pub mod state;
pub mod types;

pub use config::{ConfigError, NodeEndpoint, TransportConfig};
pub use error::TransportError;
pub use state::TransportState;
pub use types::{parse_pending, AccountBalance};
