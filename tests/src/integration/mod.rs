//! Cross-crate scenarios over the simulated node.
//!
//! | Module | Covers |
//! |--------|--------|
//! | `receive_flow` | open and receive blocks, per-block failure isolation |
//! | `send_flow` | receive-then-send, balance checks, concurrent sends |
//! | `work_flow` | precomputed work reuse, single consumer, expiry |
//! | `failover` | node rotation on rate limits and connect failures |
//! | `gateway_flow` | MCP requests through the assembled runtime |

pub mod failover;
pub mod receive_flow;
pub mod send_flow;
