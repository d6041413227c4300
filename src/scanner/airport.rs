//! Scanner backed by the macOS `airport` wireless utility

use crate::core::Reading;
use crate::processing::parse_airport_scan;
use crate::scanner::{ScanError, ScanResult, Scanner};
use std::path::PathBuf;
use std::process::Command;
use tracing::debug;

/// Location of the utility on macOS releases that still ship it
pub const AIRPORT_COMMAND: &str =
    "/System/Library/PrivateFrameworks/Apple80211.framework/Versions/Current/Resources/airport";

/// Runs `airport -s` and parses the network listing it prints
pub struct AirportScanner {
    command: PathBuf,
    args: Vec<String>,
}

impl AirportScanner {
    pub fn new() -> Self {
        Self::with_command(AIRPORT_COMMAND, vec!["-s".to_string()])
    }

    /// Use a different executable and arguments producing the same listing
    pub fn with_command(command: impl Into<PathBuf>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
        }
    }

    fn command_name(&self) -> String {
        self.command.display().to_string()
    }
}

impl Default for AirportScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for AirportScanner {
    fn scan(&mut self) -> ScanResult<Vec<Reading>> {
        let output = Command::new(&self.command)
            .args(&self.args)
            .output()
            .map_err(|e| ScanError::CommandFailed {
                command: self.command_name(),
                reason: e.to_string(),
            })?;

        if !output.status.success() {
            return Err(ScanError::NonZeroExit {
                command: self.command_name(),
                code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let listing = String::from_utf8(output.stdout).map_err(|e| ScanError::InvalidOutput {
            details: e.to_string(),
        })?;

        let readings = parse_airport_scan(&listing)?;
        debug!(command = %self.command_name(), readings = readings.len(), "scan complete");
        Ok(readings)
    }

    fn name(&self) -> &str {
        "airport"
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    #[test]
    fn test_missing_command() {
        let mut scanner = AirportScanner::with_command("/nonexistent/airport", vec!["-s".to_string()]);
        match scanner.scan() {
            Err(ScanError::CommandFailed { command, .. }) => {
                assert_eq!(command, "/nonexistent/airport");
            }
            other => panic!("Expected CommandFailed, got {:?}", other),
        }
    }

    #[test]
    fn test_non_zero_exit() {
        let mut scanner = AirportScanner::with_command(
            "sh",
            vec!["-c".to_string(), "echo 'no wifi' >&2; exit 3".to_string()],
        );
        assert_eq!(
            scanner.scan(),
            Err(ScanError::NonZeroExit {
                command: "sh".to_string(),
                code: Some(3),
                stderr: "no wifi".to_string(),
            })
        );
    }

    #[test]
    fn test_unreadable_output_is_parse_error() {
        let listing = "SSID BSSID RSSI CHANNEL\nlab 00:11:22:33:44:55 n/a 6\n";
        let mut scanner = AirportScanner::with_command("printf", vec![listing.to_string()]);
        match scanner.scan() {
            Err(error @ ScanError::Parse(_)) => assert!(!error.is_recoverable()),
            other => panic!("Expected Parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parses_command_output() {
        let listing = "SSID BSSID RSSI CHANNEL\nlab 00:11:22:33:44:55 -47 6\n";
        let mut scanner = AirportScanner::with_command("printf", vec![listing.to_string()]);
        assert_eq!(scanner.scan().unwrap(), vec![Reading::new("00:11:22:33:44:55", -47.0)]);
    }
}
