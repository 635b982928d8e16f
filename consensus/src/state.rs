//! Mutable per-participant state record

use flipnet_core::{StateSnapshot, Value};
use parking_lot::RwLock;
use std::sync::Arc;

/// Consensus state of a non-faulty participant.
///
/// `killed` and `decided` only ever flip false to true; `k` only grows.
/// Once `decided` is set, `x` holds the output bit and is never mutated
/// again.
#[derive(Debug)]
pub struct NodeState {
    /// Permanently stopped
    pub killed: bool,
    /// Current proposal
    pub x: Value,
    /// Output fixed
    pub decided: bool,
    /// Current round
    pub k: u64,
}

impl NodeState {
    pub fn new(initial_value: Value) -> Self {
        Self {
            killed: false,
            x: initial_value,
            decided: false,
            k: 0,
        }
    }

    /// Snapshot for the control surface.
    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::active(self.killed, self.x, self.decided, self.k)
    }
}

/// Shared node state
pub type SharedNodeState = Arc<RwLock<NodeState>>;

/// Create a shared node state
pub fn create_node_state(initial_value: Value) -> SharedNodeState {
    Arc::new(RwLock::new(NodeState::new(initial_value)))
}
