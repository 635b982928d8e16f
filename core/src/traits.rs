//! Core traits defining FLIPNET interfaces
//!
//! These traits define the contracts between the consensus driver and its
//! external collaborators: the outbound transport and the embedder's
//! readiness barrier.

use crate::types::{Phase, Value};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};

/// Result type for FLIPNET operations
pub type FlipnetResult<T> = Result<T, crate::error::FlipnetError>;

/// Outbound message channel used by the consensus driver.
///
/// Delivery is best-effort: implementations swallow per-peer failures and
/// return only after every attempt has resolved.
#[async_trait]
pub trait Outbound: Send + Sync {
    /// Fan a phase message out to every peer except self.
    async fn broadcast(&self, phase: Phase, value: Value, round: u64);
}

/// Cluster readiness barrier provided by the embedder.
///
/// A participant calls `set_ready` once its listener is bound; the driver
/// polls `ready` before entering its first round so no peer starts
/// broadcasting against closed ports.
pub trait ReadinessBarrier: Send + Sync {
    /// True once every participant has reported in.
    fn ready(&self) -> bool;

    /// Record participant `node_id` as reachable.
    fn set_ready(&self, node_id: usize);
}

/// Process-local readiness barrier for embedders that run the whole
/// cluster in one process.
pub struct LocalBarrier {
    flags: Vec<AtomicBool>,
}

impl LocalBarrier {
    pub fn new(total_nodes: usize) -> Self {
        Self {
            flags: (0..total_nodes).map(|_| AtomicBool::new(false)).collect(),
        }
    }
}

impl ReadinessBarrier for LocalBarrier {
    fn ready(&self) -> bool {
        self.flags.iter().all(|flag| flag.load(Ordering::SeqCst))
    }

    fn set_ready(&self, node_id: usize) {
        if let Some(flag) = self.flags.get(node_id) {
            flag.store(true, Ordering::SeqCst);
        }
    }
}

/// Barrier for a participant run on its own: always ready.
pub struct AlwaysReady;

impl ReadinessBarrier for AlwaysReady {
    fn ready(&self) -> bool {
        true
    }

    fn set_ready(&self, _node_id: usize) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_local_barrier() {
        let barrier = LocalBarrier::new(3);
        assert!(!barrier.ready());

        barrier.set_ready(0);
        barrier.set_ready(2);
        assert!(!barrier.ready());

        barrier.set_ready(1);
        assert!(barrier.ready());
    }

    #[test]
    fn test_out_of_range_ready_is_ignored() {
        let barrier = LocalBarrier::new(2);
        barrier.set_ready(7);
        assert!(!barrier.ready());
    }
}
