//! FLIPNET Transport
//!
//! HTTP message channel between participants:
//! - JSON wire messages
//! - Concurrent best-effort fan-out, failures swallowed
//!
//! The inbound half lives in the node's control surface, which feeds the
//! consensus inbox.

pub mod message;
pub mod fanout;

pub use message::*;
pub use fanout::*;
