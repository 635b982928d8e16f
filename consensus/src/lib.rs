//! FLIPNET Consensus Engine
//!
//! Implements one participant of the Ben-Or randomized binary agreement
//! protocol:
//! - Two message-exchange phases per round
//! - Majority / adoption tallies with a randomized escape
//! - Bounded waits so progress survives message loss

pub mod state;
pub mod inbox;
pub mod tally;
pub mod driver;

pub use state::*;
pub use inbox::*;
pub use tally::*;
pub use driver::*;
