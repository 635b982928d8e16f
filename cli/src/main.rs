//! FLIPNET CLI
//!
//! Operator client for driving and inspecting FLIPNET nodes.

mod commands;

use clap::{Parser, Subcommand};
use commands::{format_snapshot, ApiClient};
use flipnet_core::DEFAULT_BASE_PORT;

#[derive(Parser)]
#[command(name = "flipnet")]
#[command(about = "FLIPNET - Randomized Binary Agreement CLI")]
#[command(version)]
struct Cli {
    /// Host the nodes listen on
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port of node 0; node i listens on base-port + i
    #[arg(long, default_value_t = DEFAULT_BASE_PORT)]
    base_port: u16,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query node liveness
    Status {
        /// Node index
        node: usize,
    },

    /// Query a node's state snapshot
    State {
        /// Node index
        node: usize,
    },

    /// Start consensus on a node
    Start {
        /// Node index
        node: usize,
    },

    /// Permanently stop a node
    Stop {
        /// Node index
        node: usize,
    },

    /// Query the state of every node in the cluster
    ClusterState {
        /// Total participant count N
        #[arg(long, default_value = "3")]
        total_nodes: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Status { node } => {
            let client = ApiClient::for_node(&cli.host, cli.base_port, node);
            println!("node {}: {}", node, client.status().await?);
        }

        Commands::State { node } => {
            let client = ApiClient::for_node(&cli.host, cli.base_port, node);
            let snapshot = client.state().await?;
            println!("{}", format_snapshot(node, &snapshot));
        }

        Commands::Start { node } => {
            let client = ApiClient::for_node(&cli.host, cli.base_port, node);
            client.start().await?;
            println!("node {}: consensus started", node);
        }

        Commands::Stop { node } => {
            let client = ApiClient::for_node(&cli.host, cli.base_port, node);
            client.stop().await?;
            println!("node {}: stopped", node);
        }

        Commands::ClusterState { total_nodes } => {
            for node in 0..total_nodes {
                let client = ApiClient::for_node(&cli.host, cli.base_port, node);
                match client.state().await {
                    Ok(snapshot) => println!("{}", format_snapshot(node, &snapshot)),
                    Err(e) => println!("node {}: unreachable ({})", node, e),
                }
            }
        }
    }

    Ok(())
}
