//! Scanner abstraction

use crate::core::Reading;
use crate::scanner::ScanResult;

/// Source of signal strength readings, one scan cycle per call
pub trait Scanner {
    /// Run one scan and return every reading it observed, in any order.
    /// Unknown identifiers are expected; selection filters them later.
    fn scan(&mut self) -> ScanResult<Vec<Reading>>;

    /// Human-readable name for logs and errors
    fn name(&self) -> &str;
}
