//! Consensus driver: the per-participant round loop

use crate::inbox::SharedInbox;
use crate::state::SharedNodeState;
use crate::tally::{self, PhaseTwoOutcome};
use flipnet_core::{NodeConfig, Outbound, Phase, ReadinessBarrier, TimingConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Sequences rounds until the participant decides or is killed.
///
/// Each round broadcasts the current proposal, waits (bounded) for peer
/// messages, and applies the phase tallies. `killed` is re-checked at
/// every loop boundary and after every suspension so a stop takes effect
/// within one wait window.
pub struct ConsensusDriver {
    config: NodeConfig,
    timing: TimingConfig,
    state: SharedNodeState,
    inbox: SharedInbox,
    outbound: Arc<dyn Outbound>,
    barrier: Arc<dyn ReadinessBarrier>,
    started: AtomicBool,
}

impl ConsensusDriver {
    pub fn new(
        config: NodeConfig,
        timing: TimingConfig,
        state: SharedNodeState,
        inbox: SharedInbox,
        outbound: Arc<dyn Outbound>,
        barrier: Arc<dyn ReadinessBarrier>,
    ) -> Self {
        Self {
            config,
            timing,
            state,
            inbox,
            outbound,
            barrier,
            started: AtomicBool::new(false),
        }
    }

    /// Launch the round loop on its own task. The first call wins;
    /// repeated starts are no-ops returning `false`.
    pub fn start(self: &Arc<Self>) -> bool {
        if self.started.swap(true, Ordering::SeqCst) {
            return false;
        }

        let driver = self.clone();
        tokio::spawn(async move {
            driver.run(StdRng::from_entropy()).await;
        });

        true
    }

    fn killed(&self) -> bool {
        self.state.read().killed
    }

    /// Run the round loop to completion with the given coin-flip source.
    /// Tests inject a seeded generator; `start` uses entropy.
    pub async fn run(self: Arc<Self>, mut rng: impl Rng + Send) {
        let node_id = self.config.node_id;

        // A lone participant has nobody to exchange with: its initial
        // value is trivially the consensus.
        if self.config.total_nodes == 1 {
            let mut state = self.state.write();
            if !state.killed {
                state.decided = true;
                info!("node {} decided {} (single participant)", node_id, state.x);
            }
            return;
        }

        // Hold the first broadcast until every peer is listening.
        while !self.barrier.ready() {
            if self.killed() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }

        let quorum = self.config.wait_quorum();
        let window = Duration::from_millis(self.timing.phase_wait_ms);
        let pause = Duration::from_millis(self.timing.round_pause_ms);

        loop {
            if self.killed() {
                break;
            }

            let (x, k) = {
                let state = self.state.read();
                (state.x, state.k)
            };

            debug!("node {} round {} phase 1: proposing {}", node_id, k, x);
            self.outbound.broadcast(Phase::One, x, k).await;
            self.inbox.wait_for(Phase::One, k, quorum, window).await;
            if self.killed() {
                break;
            }

            let received = self.inbox.values(Phase::One, k);
            let x = tally::phase_one(x, &received, self.config.total_nodes);
            self.state.write().x = x;

            debug!("node {} round {} phase 2: proposing {}", node_id, k, x);
            self.outbound.broadcast(Phase::Two, x, k).await;
            self.inbox.wait_for(Phase::Two, k, quorum, window).await;
            if self.killed() {
                break;
            }

            let received = self.inbox.values(Phase::Two, k);
            let outcome = tally::phase_two(
                x,
                &received,
                self.config.total_nodes,
                self.config.presumed_faulty,
                &mut rng,
            );

            match outcome {
                PhaseTwoOutcome::Decide(value) => {
                    let mut state = self.state.write();
                    state.x = value;
                    state.decided = true;
                    info!("node {} decided {} in round {}", node_id, value, k);
                    break;
                }
                PhaseTwoOutcome::Adopt(value) => {
                    let mut state = self.state.write();
                    state.x = value;
                    state.k = k + 1;
                }
            }

            // Only the just-finished round can still receive stragglers.
            self.inbox.prune_below(k);

            tokio::time::sleep(pause).await;
        }

        debug!("node {} driver exited", node_id);
    }
}
