//! Scan error types and recovery hints

use crate::processing::ParseError;
use thiserror::Error;

/// Failures while acquiring signal strength readings
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    /// The scan command could not be started
    #[error("Failed to run scan command '{command}': {reason}")]
    CommandFailed { command: String, reason: String },
    /// The scan command ran but reported failure
    #[error("Scan command '{command}' exited with {}: {stderr}", describe_exit(.code))]
    NonZeroExit {
        command: String,
        code: Option<i32>,
        stderr: String,
    },
    /// Output was not valid UTF-8 or not in the expected shape
    #[error("Invalid scan output: {details}")]
    InvalidOutput { details: String },
    #[error(transparent)]
    Parse(#[from] ParseError),
    /// Scanner is not able to scan right now
    #[error("Scanner '{scanner}' unavailable")]
    Unavailable { scanner: String },
    /// A scripted scanner has no scans left
    #[error("No scan data available")]
    NoScanData,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("status {}", code),
        None => "signal".to_string(),
    }
}

/// Result type for scan operations
pub type ScanResult<T> = Result<T, ScanError>;

/// What the caller should do after a scan failure
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RecoveryStrategy {
    /// Scan again
    Retry,
    /// Wait and then scan again
    RetryWithDelay { delay_ms: u32 },
    /// Give up
    Fail,
}

impl ScanError {
    /// Get the recommended recovery strategy for this error
    pub fn recovery_strategy(&self) -> RecoveryStrategy {
        match self {
            ScanError::CommandFailed { .. } => RecoveryStrategy::Fail,
            ScanError::NonZeroExit { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 1000 },
            ScanError::InvalidOutput { .. } => RecoveryStrategy::Retry,
            ScanError::Parse(_) => RecoveryStrategy::Fail,
            ScanError::Unavailable { .. } => RecoveryStrategy::RetryWithDelay { delay_ms: 500 },
            ScanError::NoScanData => RecoveryStrategy::Fail,
        }
    }

    /// Check if this error is recoverable
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery_strategy(), RecoveryStrategy::Fail)
    }
}
