//! Failover state owned by one transport instance.

use super::config::NodeEndpoint;

/// The node list and the index of the node currently preferred.
#[derive(Debug, Clone)]
pub struct TransportState {
    nodes: Vec<NodeEndpoint>,
    current_index: usize,
}

impl TransportState {
    pub fn new(nodes: Vec<NodeEndpoint>) -> Self {
        Self {
            nodes,
            current_index: 0,
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// The preferred node with its index.
    pub fn current(&self) -> Option<(usize, NodeEndpoint)> {
        self.nodes
            .get(self.current_index)
            .map(|node| (self.current_index, node.clone()))
    }

    /// Move past `failed` unless another caller already rotated.
    ///
    /// Returns the new current index.
    pub fn rotate_from(&mut self, failed: usize) -> usize {
        if !self.nodes.is_empty() && self.current_index == failed {
            self.current_index = (failed + 1) % self.nodes.len();
        }
        self.current_index
    }

    pub fn nodes(&self) -> &[NodeEndpoint] {
        &self.nodes
    }
}
