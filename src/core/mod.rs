//! Core types and constants for RSSI-based indoor positioning

pub mod types;
pub mod constants;

pub use types::*;
pub use constants::*;
