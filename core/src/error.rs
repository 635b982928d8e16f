//! Error types for FLIPNET

use thiserror::Error;

/// Main error type for FLIPNET
#[derive(Error, Debug)]
pub enum FlipnetError {
    // ============ Lifecycle Errors ============
    #[error("node is faulty")]
    NodeFaulty,

    #[error("node has been stopped")]
    NodeKilled,

    #[error("consensus already running")]
    AlreadyRunning,

    // ============ Message Errors ============
    #[error("invalid message: {0}")]
    InvalidMessage(String),

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(u8),

    // ============ Transport Errors ============
    #[error("peer unreachable: {0}")]
    PeerUnreachable(String),

    #[error("message serialization failed: {0}")]
    SerializationError(String),

    // ============ Configuration Errors ============
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("invalid node id {node_id} for cluster of {total}")]
    InvalidNodeId { node_id: usize, total: usize },

    // ============ General Errors ============
    #[error("internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl From<std::io::Error> for FlipnetError {
    fn from(err: std::io::Error) -> Self {
        FlipnetError::Internal(err.to_string())
    }
}

impl From<serde_json::Error> for FlipnetError {
    fn from(err: serde_json::Error) -> Self {
        FlipnetError::SerializationError(err.to_string())
    }
}
