//! Acquisition of signal strength readings
//!
//! Scanners produce raw `(identifier, rssi)` readings; resolving them against
//! the reference table happens in [`crate::validation`].

pub mod interface;
pub mod mock;
pub mod airport;
pub mod error;

pub use interface::Scanner;
pub use mock::MockScanner;
pub use airport::{AirportScanner, AIRPORT_COMMAND};
pub use error::{RecoveryStrategy, ScanError, ScanResult};
