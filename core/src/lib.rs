//! FLIPNET Core Library
//!
//! Core types, traits, and configuration for FLIPNET, a randomized binary
//! Byzantine-agreement participant. This crate provides the foundation for
//! all other FLIPNET components.

pub mod types;
pub mod traits;
pub mod error;
pub mod config;

pub use types::*;
pub use traits::*;
pub use error::*;
pub use config::*;
