//! Configuration types for FLIPNET

use crate::error::FlipnetError;
use crate::types::Value;
use serde::{Deserialize, Serialize};

/// Default TCP port of node 0; node `i` listens on `base_port + i`.
pub const DEFAULT_BASE_PORT: u16 = 3000;

/// Per-participant configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeConfig {
    /// Node index in `[0, total_nodes)`
    pub node_id: usize,

    /// Total participant count N
    pub total_nodes: usize,

    /// Presumed faulty count F
    pub presumed_faulty: usize,

    /// Initial binary proposal
    pub initial_value: Value,

    /// This participant models an omission fault
    pub is_faulty: bool,

    /// Port of node 0; node `i` listens on `base_port + i`
    pub base_port: u16,
}

impl NodeConfig {
    pub fn new(
        node_id: usize,
        total_nodes: usize,
        presumed_faulty: usize,
        initial_value: Value,
        is_faulty: bool,
    ) -> Self {
        Self {
            node_id,
            total_nodes,
            presumed_faulty,
            initial_value,
            is_faulty,
            base_port: DEFAULT_BASE_PORT,
        }
    }

    pub fn with_base_port(mut self, base_port: u16) -> Self {
        self.base_port = base_port;
        self
    }

    /// Check construction inputs against the protocol bounds.
    pub fn validate(&self) -> Result<(), FlipnetError> {
        if self.total_nodes == 0 {
            return Err(FlipnetError::ConfigError(
                "total_nodes must be at least 1".into(),
            ));
        }
        if self.node_id >= self.total_nodes {
            return Err(FlipnetError::InvalidNodeId {
                node_id: self.node_id,
                total: self.total_nodes,
            });
        }
        if self.presumed_faulty >= self.total_nodes {
            return Err(FlipnetError::ConfigError(format!(
                "presumed_faulty {} must be below total_nodes {}",
                self.presumed_faulty, self.total_nodes
            )));
        }
        if !self.initial_value.is_binary() {
            return Err(FlipnetError::InvalidValue(
                "initial value must be 0 or 1".into(),
            ));
        }
        Ok(())
    }

    /// Port this participant listens on.
    pub fn port(&self) -> u16 {
        self.base_port + self.node_id as u16
    }

    /// Listen address for the control surface.
    pub fn listen_addr(&self) -> String {
        format!("127.0.0.1:{}", self.port())
    }

    /// Base URL of peer `i`.
    pub fn peer_url(&self, peer_id: usize) -> String {
        format!("http://127.0.0.1:{}", self.base_port + peer_id as u16)
    }

    /// Bounded-wait quorum: messages expected from non-faulty peers.
    pub fn wait_quorum(&self) -> usize {
        self.total_nodes
            .saturating_sub(self.presumed_faulty)
            .saturating_sub(1)
    }
}

/// Protocol timers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Bounded wait window per phase, in milliseconds
    pub phase_wait_ms: u64,

    /// Pause between rounds, in milliseconds
    pub round_pause_ms: u64,

    /// Outbound request timeout, in milliseconds (transport, not protocol)
    pub request_timeout_ms: u64,
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            phase_wait_ms: 200,
            round_pause_ms: 10,
            request_timeout_ms: 500,
        }
    }
}

/// Cluster launcher configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Total participant count N
    pub total_nodes: usize,

    /// Presumed faulty count F
    pub presumed_faulty: usize,

    /// Indices of participants launched as faulty
    pub faulty_nodes: Vec<usize>,

    /// Initial proposal per node; missing entries default to 1
    pub initial_values: Vec<Value>,

    /// Port of node 0
    pub base_port: u16,
}

impl ClusterConfig {
    /// Build the per-node configuration for participant `node_id`.
    pub fn node_config(&self, node_id: usize) -> NodeConfig {
        let initial_value = self
            .initial_values
            .get(node_id)
            .copied()
            .unwrap_or(Value::One);

        NodeConfig {
            node_id,
            total_nodes: self.total_nodes,
            presumed_faulty: self.presumed_faulty,
            initial_value,
            is_faulty: self.faulty_nodes.contains(&node_id),
            base_port: self.base_port,
        }
    }
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            total_nodes: 3,
            presumed_faulty: 0,
            faulty_nodes: vec![],
            initial_values: vec![],
            base_port: DEFAULT_BASE_PORT,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        let config = NodeConfig::new(0, 3, 1, Value::Zero, false);
        assert!(config.validate().is_ok());

        let bad_id = NodeConfig::new(3, 3, 0, Value::Zero, false);
        assert!(bad_id.validate().is_err());

        let bad_faulty = NodeConfig::new(0, 3, 3, Value::Zero, false);
        assert!(bad_faulty.validate().is_err());

        let bad_initial = NodeConfig::new(0, 3, 0, Value::Maybe, false);
        assert!(bad_initial.validate().is_err());
    }

    #[test]
    fn test_port_assignment() {
        let config = NodeConfig::new(2, 5, 1, Value::One, false).with_base_port(4000);
        assert_eq!(config.port(), 4002);
        assert_eq!(config.peer_url(4), "http://127.0.0.1:4004");
    }

    #[test]
    fn test_wait_quorum() {
        let config = NodeConfig::new(0, 10, 4, Value::One, false);
        assert_eq!(config.wait_quorum(), 5);

        let single = NodeConfig::new(0, 1, 0, Value::One, false);
        assert_eq!(single.wait_quorum(), 0);
    }

    #[test]
    fn test_cluster_node_config() {
        let cluster = ClusterConfig {
            total_nodes: 4,
            presumed_faulty: 1,
            faulty_nodes: vec![3],
            initial_values: vec![Value::Zero, Value::Zero, Value::Zero],
            base_port: 3100,
        };

        let node0 = cluster.node_config(0);
        assert_eq!(node0.initial_value, Value::Zero);
        assert!(!node0.is_faulty);

        let node3 = cluster.node_config(3);
        assert!(node3.is_faulty);
        // No explicit initial value for node 3
        assert_eq!(node3.initial_value, Value::One);
    }
}
