//! Outbound ports: where work comes from and what time it is.

pub mod outbound;

pub use outbound::*;
