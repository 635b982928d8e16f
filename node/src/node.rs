//! Full participant node

use crate::api::create_router;
use crate::runtime::{FaultyNode, NodeRuntime, Participant};
use flipnet_core::{
    AlwaysReady, ClusterConfig, FlipnetResult, LocalBarrier, NodeConfig, ReadinessBarrier,
    TimingConfig, Value,
};
use flipnet_transport::HttpFanout;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

/// One FLIPNET participant: a control surface plus either a consensus
/// runtime or a faulty placeholder.
pub struct FlipnetNode {
    participant: Arc<Participant>,
    config: NodeConfig,
    barrier: Arc<dyn ReadinessBarrier>,
}

impl FlipnetNode {
    /// Create a new node
    pub fn new(
        config: NodeConfig,
        timing: TimingConfig,
        barrier: Arc<dyn ReadinessBarrier>,
    ) -> FlipnetResult<Self> {
        config.validate()?;

        let participant = if config.is_faulty {
            Participant::Faulty(FaultyNode::new())
        } else {
            let outbound = Arc::new(HttpFanout::new(&config, &timing));
            Participant::Active(NodeRuntime::new(
                config.clone(),
                timing,
                outbound,
                barrier.clone(),
            ))
        };

        Ok(Self {
            participant: Arc::new(participant),
            config,
            barrier,
        })
    }

    /// Get participant reference
    pub fn participant(&self) -> Arc<Participant> {
        self.participant.clone()
    }

    /// Get config reference
    pub fn config(&self) -> &NodeConfig {
        &self.config
    }

    /// Bind the control surface and serve it on a background task.
    ///
    /// The readiness barrier is notified only after the listener is
    /// bound, so a ready cluster has no closed ports.
    pub async fn spawn(&self) -> anyhow::Result<JoinHandle<()>> {
        let addr = self.config.listen_addr();
        let listener = tokio::net::TcpListener::bind(&addr).await?;
        let router = create_router(self.participant.clone());

        info!(
            "node {} listening on {}{}",
            self.config.node_id,
            addr,
            if self.config.is_faulty { " (faulty)" } else { "" }
        );

        self.barrier.set_ready(self.config.node_id);

        Ok(tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                error!("API server error: {}", e);
            }
        }))
    }
}

/// Node builder for easier configuration
pub struct NodeBuilder {
    config: NodeConfig,
    timing: TimingConfig,
    barrier: Arc<dyn ReadinessBarrier>,
}

impl NodeBuilder {
    pub fn new(node_id: usize, total_nodes: usize) -> Self {
        Self {
            config: NodeConfig::new(node_id, total_nodes, 0, Value::One, false),
            timing: TimingConfig::default(),
            barrier: Arc::new(AlwaysReady),
        }
    }

    pub fn presumed_faulty(mut self, presumed_faulty: usize) -> Self {
        self.config.presumed_faulty = presumed_faulty;
        self
    }

    pub fn initial_value(mut self, value: Value) -> Self {
        self.config.initial_value = value;
        self
    }

    pub fn faulty(mut self) -> Self {
        self.config.is_faulty = true;
        self
    }

    pub fn base_port(mut self, base_port: u16) -> Self {
        self.config.base_port = base_port;
        self
    }

    pub fn timing(mut self, timing: TimingConfig) -> Self {
        self.timing = timing;
        self
    }

    pub fn barrier(mut self, barrier: Arc<dyn ReadinessBarrier>) -> Self {
        self.barrier = barrier;
        self
    }

    pub fn build(self) -> FlipnetResult<FlipnetNode> {
        FlipnetNode::new(self.config, self.timing, self.barrier)
    }
}

/// Launch a whole cluster in one process, sharing a local readiness
/// barrier. Returns the nodes with their control surfaces already bound.
pub async fn launch_cluster(
    config: &ClusterConfig,
    timing: TimingConfig,
) -> anyhow::Result<Vec<FlipnetNode>> {
    let barrier: Arc<LocalBarrier> = Arc::new(LocalBarrier::new(config.total_nodes));
    let mut nodes = Vec::new();

    for node_id in 0..config.total_nodes {
        let node = FlipnetNode::new(
            config.node_config(node_id),
            timing.clone(),
            barrier.clone(),
        )?;
        node.spawn().await?;
        nodes.push(node);
    }

    info!(
        "cluster of {} nodes up ({} faulty)",
        config.total_nodes,
        config.faulty_nodes.len()
    );

    Ok(nodes)
}
