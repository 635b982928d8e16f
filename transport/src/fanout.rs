//! Best-effort HTTP fan-out to all peers

use crate::message::PeerMessage;
use async_trait::async_trait;
use flipnet_core::{NodeConfig, Outbound, Phase, TimingConfig, Value};
use futures::future::join_all;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Outbound half of the transport adapter: one HTTP POST per peer,
/// dispatched concurrently.
///
/// Per-peer failures are swallowed; a peer that never answers is
/// indistinguishable from a faulty one, and the tally thresholds carry
/// correctness either way.
pub struct HttpFanout {
    node_id: usize,
    peer_urls: Vec<(usize, String)>,
    client: Client,
}

impl HttpFanout {
    pub fn new(config: &NodeConfig, timing: &TimingConfig) -> Self {
        let peer_urls = (0..config.total_nodes)
            .filter(|&peer_id| peer_id != config.node_id)
            .map(|peer_id| (peer_id, format!("{}/message", config.peer_url(peer_id))))
            .collect();

        let client = Client::builder()
            .timeout(Duration::from_millis(timing.request_timeout_ms))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            node_id: config.node_id,
            peer_urls,
            client,
        }
    }

    async fn send_to_peer(&self, peer_id: usize, url: &str, message: &PeerMessage) {
        match self.client.post(url).json(message).send().await {
            Ok(response) if !response.status().is_success() => {
                debug!(
                    "node {}: peer {} rejected message ({})",
                    self.node_id,
                    peer_id,
                    response.status()
                );
            }
            Ok(_) => {}
            Err(err) => {
                debug!("node {}: peer {} unreachable: {}", self.node_id, peer_id, err);
            }
        }
    }
}

#[async_trait]
impl Outbound for HttpFanout {
    async fn broadcast(&self, phase: Phase, value: Value, round: u64) {
        let message = PeerMessage::new(phase, value, round, self.node_id);

        let sends = self
            .peer_urls
            .iter()
            .map(|(peer_id, url)| self.send_to_peer(*peer_id, url, &message));

        // Resolves only once every per-peer attempt has finished.
        join_all(sends).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fanout_skips_self() {
        let config = NodeConfig::new(1, 4, 1, Value::One, false).with_base_port(3200);
        let fanout = HttpFanout::new(&config, &TimingConfig::default());

        let targets: Vec<usize> = fanout.peer_urls.iter().map(|(id, _)| *id).collect();
        assert_eq!(targets, vec![0, 2, 3]);
        assert_eq!(fanout.peer_urls[0].1, "http://127.0.0.1:3200/message");
    }

    #[tokio::test]
    async fn test_broadcast_swallows_unreachable_peers() {
        // Nothing listens on these ports; broadcast must still return.
        let config = NodeConfig::new(0, 3, 0, Value::One, false).with_base_port(39200);
        let timing = TimingConfig {
            request_timeout_ms: 100,
            ..TimingConfig::default()
        };
        let fanout = HttpFanout::new(&config, &timing);

        fanout.broadcast(Phase::One, Value::One, 0).await;
    }
}
