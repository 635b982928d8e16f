//! CLI Commands

use flipnet_core::StateSnapshot;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

/// API Client for interacting with a FLIPNET node
pub struct ApiClient {
    base_url: String,
    client: Client,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::builder()
                .timeout(Duration::from_secs(5))
                .build()
                .expect("Failed to create HTTP client"),
        }
    }

    /// Client for node `node_id` of a cluster rooted at `base_port`.
    pub fn for_node(host: &str, base_port: u16, node_id: usize) -> Self {
        Self::new(&format!("http://{}:{}", host, base_port + node_id as u16))
    }

    /// Get node status: "live" or "faulty"
    pub async fn status(&self) -> Result<String, ApiError> {
        let url = format!("{}/status", self.base_url);
        let response = self.client.get(&url).send().await?;

        // A faulty node reports its status with a 500; that is still an
        // answer, not a transport failure.
        Ok(response.json().await?)
    }

    /// Get the node's state snapshot
    pub async fn state(&self) -> Result<StateSnapshot, ApiError> {
        let url = format!("{}/getState", self.base_url);
        Ok(self.client.get(&url).send().await?.json().await?)
    }

    /// Start consensus on the node
    pub async fn start(&self) -> Result<(), ApiError> {
        let url = format!("{}/start", self.base_url);
        let resp: ControlResponse = self.client.get(&url).send().await?.json().await?;

        if resp.success {
            Ok(())
        } else {
            Err(ApiError::Server(resp.error.unwrap_or_default()))
        }
    }

    /// Permanently stop the node
    pub async fn stop(&self) -> Result<(), ApiError> {
        let url = format!("{}/stop", self.base_url);
        let resp: ControlResponse = self.client.get(&url).send().await?.json().await?;

        if resp.success {
            Ok(())
        } else {
            Err(ApiError::Server(resp.error.unwrap_or_default()))
        }
    }
}

/// Control endpoint response: `{success:true}` or `{error}`
#[derive(Deserialize)]
struct ControlResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    error: Option<String>,
}

/// API Error
#[derive(Debug)]
pub enum ApiError {
    Http(reqwest::Error),
    Server(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err)
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Http(e) => write!(f, "HTTP error: {}", e),
            ApiError::Server(e) => write!(f, "Server error: {}", e),
        }
    }
}

impl std::error::Error for ApiError {}

/// Render a snapshot for the terminal.
pub fn format_snapshot(node_id: usize, snapshot: &StateSnapshot) -> String {
    match (snapshot.x, snapshot.decided, snapshot.k) {
        (Some(x), Some(decided), Some(k)) => format!(
            "node {}: killed={} x={} decided={} k={}",
            node_id, snapshot.killed, x, decided, k
        ),
        _ => format!("node {}: killed={} (faulty)", node_id, snapshot.killed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flipnet_core::Value;

    #[test]
    fn test_base_url_trimming() {
        let client = ApiClient::new("http://127.0.0.1:3000/");
        assert_eq!(client.base_url, "http://127.0.0.1:3000");
    }

    #[test]
    fn test_for_node_addressing() {
        let client = ApiClient::for_node("127.0.0.1", 3000, 2);
        assert_eq!(client.base_url, "http://127.0.0.1:3002");
    }

    #[test]
    fn test_format_snapshot() {
        let live = StateSnapshot::active(false, Value::Maybe, false, 2);
        assert_eq!(
            format_snapshot(1, &live),
            "node 1: killed=false x=? decided=false k=2"
        );

        let faulty = StateSnapshot::faulty(true);
        assert_eq!(format_snapshot(3, &faulty), "node 3: killed=true (faulty)");
    }

    #[test]
    fn test_control_response_error_shape() {
        let resp: ControlResponse =
            serde_json::from_str(r#"{"error":"node is faulty"}"#).unwrap();
        assert!(!resp.success);
        assert_eq!(resp.error.as_deref(), Some("node is faulty"));
    }
}
