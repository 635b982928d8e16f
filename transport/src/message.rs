//! Wire messages for the FLIPNET protocol

use flipnet_core::{Phase, Value};
use serde::{Deserialize, Serialize};

/// Protocol message exchanged between peers via `POST /message`.
///
/// `value` uses the heterogeneous wire encoding from `flipnet_core::Value`:
/// bits as JSON numbers, the no-majority sentinel as the string `"?"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerMessage {
    /// Exchange phase, 1 or 2
    pub phase: Phase,
    /// Proposal carried by this message
    pub value: Value,
    /// Round the message belongs to
    pub k: u64,
    /// Sender index
    pub from: usize,
}

impl PeerMessage {
    pub fn new(phase: Phase, value: Value, k: u64, from: usize) -> Self {
        Self {
            phase,
            value,
            k,
            from,
        }
    }
}
