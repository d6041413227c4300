//! Scripted scanner for tests and offline runs

use crate::algorithms::propagation::PropagationModel;
use crate::core::{Position, Reading, ReferencePoint};
use crate::scanner::{ScanError, ScanResult, Scanner};
use std::collections::VecDeque;

/// Scanner that replays queued scans in order
pub struct MockScanner {
    scans: VecDeque<Vec<Reading>>,
    scan_count: usize,
    connected: bool,
}

impl MockScanner {
    pub fn new() -> Self {
        Self {
            scans: VecDeque::new(),
            scan_count: 0,
            connected: true,
        }
    }

    /// Queue one scan result
    pub fn push_scan(&mut self, readings: Vec<Reading>) {
        self.scans.push_back(readings);
    }

    /// Queue the noise-free readings a device at `device` would observe
    pub fn push_synthetic_scan(
        &mut self,
        device: Position,
        reference_points: &[ReferencePoint],
        model: &PropagationModel,
    ) {
        let readings = reference_points
            .iter()
            .map(|point| {
                let distance = device.distance_to(&point.position);
                Reading::new(point.id.clone(), model.expected_rssi(distance))
            })
            .collect();
        self.push_scan(readings);
    }

    /// Simulate the wireless interface going away
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn reconnect(&mut self) {
        self.connected = true;
    }

    pub fn queued_scan_count(&self) -> usize {
        self.scans.len()
    }

    /// Number of scans served so far
    pub fn scan_count(&self) -> usize {
        self.scan_count
    }
}

impl Default for MockScanner {
    fn default() -> Self {
        Self::new()
    }
}

impl Scanner for MockScanner {
    fn scan(&mut self) -> ScanResult<Vec<Reading>> {
        if !self.connected {
            return Err(ScanError::Unavailable {
                scanner: self.name().to_string(),
            });
        }

        let readings = self.scans.pop_front().ok_or(ScanError::NoScanData)?;
        self.scan_count += 1;
        Ok(readings)
    }

    fn name(&self) -> &str {
        "mock"
    }
}
