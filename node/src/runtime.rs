//! Participant runtime combining all components

use flipnet_consensus::{
    create_inbox, create_node_state, ConsensusDriver, SharedInbox, SharedNodeState,
};
use flipnet_core::{
    FlipnetError, FlipnetResult, NodeConfig, Outbound, ReadinessBarrier, StateSnapshot,
    TimingConfig,
};
use flipnet_transport::PeerMessage;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, info};

/// Runtime of a non-faulty participant: state, inbox, and driver wired to
/// an outbound transport and the embedder's readiness barrier.
pub struct NodeRuntime {
    config: NodeConfig,
    state: SharedNodeState,
    inbox: SharedInbox,
    driver: Arc<ConsensusDriver>,
}

impl NodeRuntime {
    pub fn new(
        config: NodeConfig,
        timing: TimingConfig,
        outbound: Arc<dyn Outbound>,
        barrier: Arc<dyn ReadinessBarrier>,
    ) -> Self {
        let state = create_node_state(config.initial_value);
        let inbox = create_inbox();

        let driver = Arc::new(ConsensusDriver::new(
            config.clone(),
            timing,
            state.clone(),
            inbox.clone(),
            outbound,
            barrier,
        ));

        Self {
            config,
            state,
            inbox,
            driver,
        }
    }

    /// Get config reference
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    pub fn is_killed(&self) -> bool {
        self.state.read().killed
    }

    /// Current state for the control surface.
    pub fn snapshot(&self) -> StateSnapshot {
        self.state.read().snapshot()
    }

    /// Start the consensus driver. Re-entrant: a second start while
    /// running is a no-op.
    pub fn start(&self) -> FlipnetResult<()> {
        if self.is_killed() {
            return Err(FlipnetError::NodeKilled);
        }

        if self.driver.start() {
            info!("node {} starting consensus", self.config.node_id);
        } else {
            debug!("node {} already running", self.config.node_id);
        }

        Ok(())
    }

    /// Permanently stop the participant.
    pub fn stop(&self) {
        let mut state = self.state.write();
        if !state.killed {
            state.killed = true;
            info!("node {} stopped", self.config.node_id);
        }
    }

    /// Deliver an inbound peer message into the inbox.
    pub fn deliver(&self, message: PeerMessage) -> FlipnetResult<()> {
        if self.is_killed() {
            return Err(FlipnetError::NodeKilled);
        }

        self.inbox
            .deliver(message.phase, message.k, message.value, message.from);
        Ok(())
    }
}

/// A participant modeling an omission fault: it neither sends nor
/// processes protocol messages and reports no consensus state. Only the
/// killed flag is live.
pub struct FaultyNode {
    killed: AtomicBool,
}

impl FaultyNode {
    pub fn new() -> Self {
        Self {
            killed: AtomicBool::new(false),
        }
    }

    pub fn is_killed(&self) -> bool {
        self.killed.load(Ordering::SeqCst)
    }

    pub fn kill(&self) {
        self.killed.store(true, Ordering::SeqCst);
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot::faulty(self.is_killed())
    }
}

impl Default for FaultyNode {
    fn default() -> Self {
        Self::new()
    }
}

/// A cluster participant: either a live consensus runtime or a faulty
/// placeholder. Keeping the fault model out of the driver keeps the
/// non-faulty state machine branch-free.
pub enum Participant {
    Active(NodeRuntime),
    Faulty(FaultyNode),
}

impl Participant {
    pub fn is_faulty(&self) -> bool {
        matches!(self, Participant::Faulty(_))
    }

    pub fn snapshot(&self) -> StateSnapshot {
        match self {
            Participant::Active(runtime) => runtime.snapshot(),
            Participant::Faulty(node) => node.snapshot(),
        }
    }

    pub fn start(&self) -> FlipnetResult<()> {
        match self {
            Participant::Active(runtime) => runtime.start(),
            Participant::Faulty(_) => Err(FlipnetError::NodeFaulty),
        }
    }

    pub fn stop(&self) {
        match self {
            Participant::Active(runtime) => runtime.stop(),
            Participant::Faulty(node) => node.kill(),
        }
    }

    pub fn deliver(&self, message: PeerMessage) -> FlipnetResult<()> {
        match self {
            Participant::Active(runtime) => runtime.deliver(message),
            Participant::Faulty(_) => Err(FlipnetError::NodeFaulty),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipnet_core::{AlwaysReady, Phase, Value};

    struct NullOutbound;

    #[async_trait::async_trait]
    impl Outbound for NullOutbound {
        async fn broadcast(&self, _phase: Phase, _value: Value, _round: u64) {}
    }

    fn test_runtime(total_nodes: usize) -> NodeRuntime {
        let config = NodeConfig::new(0, total_nodes, 0, Value::One, false);
        NodeRuntime::new(
            config,
            TimingConfig::default(),
            Arc::new(NullOutbound),
            Arc::new(AlwaysReady),
        )
    }

    #[tokio::test]
    async fn test_deliver_after_stop_is_rejected() {
        let runtime = test_runtime(3);
        runtime.stop();

        let message = PeerMessage::new(Phase::One, Value::Zero, 0, 1);
        assert!(matches!(
            runtime.deliver(message),
            Err(FlipnetError::NodeKilled)
        ));
    }

    #[tokio::test]
    async fn test_start_after_stop_is_rejected() {
        let runtime = test_runtime(3);
        runtime.stop();

        assert!(matches!(runtime.start(), Err(FlipnetError::NodeKilled)));
        assert!(runtime.snapshot().killed);
    }

    #[tokio::test]
    async fn test_stop_is_permanent_and_idempotent() {
        let runtime = test_runtime(3);
        runtime.stop();
        runtime.stop();

        assert!(runtime.is_killed());
    }

    #[test]
    fn test_faulty_participant_surface() {
        let participant = Participant::Faulty(FaultyNode::new());

        assert!(participant.is_faulty());
        assert!(matches!(
            participant.start(),
            Err(FlipnetError::NodeFaulty)
        ));
        assert!(matches!(
            participant.deliver(PeerMessage::new(Phase::One, Value::Zero, 0, 1)),
            Err(FlipnetError::NodeFaulty)
        ));

        assert_eq!(participant.snapshot(), StateSnapshot::faulty(false));

        participant.stop();
        assert_eq!(participant.snapshot(), StateSnapshot::faulty(true));
    }
}
