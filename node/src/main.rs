//! FLIPNET Node Binary

use clap::{Parser, Subcommand};
use flipnet_core::{ClusterConfig, TimingConfig, Value, DEFAULT_BASE_PORT};
use flipnet_node::{launch_cluster, NodeBuilder};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "flipnet-node")]
#[command(about = "FLIPNET - Randomized Binary Agreement Node")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a single participant
    Run {
        /// Node index in [0, total-nodes)
        #[arg(long)]
        node_id: usize,

        /// Total participant count N
        #[arg(long)]
        total_nodes: usize,

        /// Presumed faulty count F
        #[arg(long, default_value = "0")]
        presumed_faulty: usize,

        /// Initial binary proposal (0 or 1)
        #[arg(long, default_value = "1")]
        initial_value: u8,

        /// Launch as a faulty participant
        #[arg(long)]
        faulty: bool,

        /// Port of node 0; this node listens on base-port + node-id
        #[arg(long, default_value_t = DEFAULT_BASE_PORT)]
        base_port: u16,

        /// Start consensus immediately instead of waiting for /start
        #[arg(long)]
        start: bool,
    },

    /// Run a whole cluster in one process
    Cluster {
        /// Total participant count N
        #[arg(long, default_value = "3")]
        total_nodes: usize,

        /// Presumed faulty count F
        #[arg(long, default_value = "0")]
        presumed_faulty: usize,

        /// Indices launched as faulty participants
        #[arg(long, value_delimiter = ',')]
        faulty: Vec<usize>,

        /// Initial proposals per node (0/1, comma separated)
        #[arg(long, value_delimiter = ',')]
        initial_values: Vec<u8>,

        /// Port of node 0
        #[arg(long, default_value_t = DEFAULT_BASE_PORT)]
        base_port: u16,

        /// Start consensus immediately instead of waiting for /start
        #[arg(long)]
        start: bool,
    },
}

fn parse_value(bit: u8) -> anyhow::Result<Value> {
    Value::from_bit(bit).ok_or_else(|| anyhow::anyhow!("initial value must be 0 or 1, got {}", bit))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            node_id,
            total_nodes,
            presumed_faulty,
            initial_value,
            faulty,
            base_port,
            start,
        } => {
            info!("Starting FLIPNET node {}...", node_id);

            let mut builder = NodeBuilder::new(node_id, total_nodes)
                .presumed_faulty(presumed_faulty)
                .initial_value(parse_value(initial_value)?)
                .base_port(base_port);

            if faulty {
                builder = builder.faulty();
            }

            let node = builder.build()?;
            node.spawn().await?;

            if start && !faulty {
                node.participant().start()?;
            }

            wait_for_shutdown().await;
        }

        Commands::Cluster {
            total_nodes,
            presumed_faulty,
            faulty,
            initial_values,
            base_port,
            start,
        } => {
            info!("Starting FLIPNET cluster of {} nodes...", total_nodes);

            let initial_values = initial_values
                .into_iter()
                .map(parse_value)
                .collect::<anyhow::Result<Vec<Value>>>()?;

            let config = ClusterConfig {
                total_nodes,
                presumed_faulty,
                faulty_nodes: faulty,
                initial_values,
                base_port,
            };

            // Validate the whole layout before binding anything.
            for node_id in 0..total_nodes {
                config.node_config(node_id).validate()?;
            }

            let nodes = launch_cluster(&config, TimingConfig::default()).await?;

            if start {
                for node in &nodes {
                    if !node.config().is_faulty {
                        node.participant().start()?;
                    }
                }
                info!("consensus started on all live nodes");
            }

            wait_for_shutdown().await;
        }
    }

    Ok(())
}

async fn wait_for_shutdown() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, stopping..."),
        Err(e) => tracing::error!("Error waiting for shutdown signal: {}", e),
    }
}
