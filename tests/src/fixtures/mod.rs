//! Shared fixtures for the integration scenarios.

pub mod harness;
pub mod node;

pub use harness::{
    keypair, local_generator, orchestrator_config, transport_config, Harness, HarnessBuilder,
    NODE_A, NODE_B, RECEIVE_THRESHOLD, SEND_THRESHOLD,
};
pub use node::{FlakyConnector, SimulatedNode};
