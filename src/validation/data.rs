//! Selection of the three reference readings used for a fix

use crate::core::{Reading, ReferencePoint, REQUIRED_REFERENCE_POINTS};
use crate::utils::reference_table::{normalize_id, ReferenceTable};
use crate::validation::error::{PositioningError, PositioningResult};
use std::collections::HashMap;
use tracing::{debug, warn};

/// A reading matched to a known reference point
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedReading {
    pub point: ReferencePoint,
    pub rssi: f64,
}

/// Picks the strongest three known reference points out of a scan
#[derive(Debug, Clone, Default)]
pub struct ReadingSelector {
    /// Readings weaker than this are ignored
    min_rssi: Option<f64>,
}

impl ReadingSelector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_min_rssi(min_rssi: f64) -> Self {
        Self {
            min_rssi: Some(min_rssi),
        }
    }

    pub fn min_rssi(&self) -> Option<f64> {
        self.min_rssi
    }

    /// Resolve readings against the table and keep the strongest three.
    ///
    /// Unknown identifiers and non-finite signal strengths are dropped, and a
    /// reference point reported more than once keeps its strongest reading.
    /// The result is ordered strongest first; equal strengths are ordered by
    /// identifier so the output does not depend on scan order.
    pub fn select(
        &self,
        readings: &[Reading],
        table: &ReferenceTable,
    ) -> PositioningResult<[ResolvedReading; 3]> {
        let mut strongest: HashMap<String, ResolvedReading> = HashMap::new();

        for reading in readings {
            if !reading.rssi.is_finite() {
                warn!(id = %reading.id, rssi = reading.rssi, "dropping non-finite reading");
                continue;
            }
            let Some(point) = table.get(&reading.id) else {
                continue;
            };
            if let Some(min_rssi) = self.min_rssi {
                if reading.rssi < min_rssi {
                    debug!(id = %reading.id, rssi = reading.rssi, min_rssi, "reading below threshold");
                    continue;
                }
            }

            strongest
                .entry(normalize_id(&reading.id))
                .and_modify(|existing| existing.rssi = existing.rssi.max(reading.rssi))
                .or_insert_with(|| ResolvedReading {
                    point: point.clone(),
                    rssi: reading.rssi,
                });
        }

        let mut resolved: Vec<ResolvedReading> = strongest.into_values().collect();
        resolved.sort_by(|a, b| {
            b.rssi
                .total_cmp(&a.rssi)
                .then_with(|| normalize_id(&a.point.id).cmp(&normalize_id(&b.point.id)))
        });

        debug!(
            scanned = readings.len(),
            resolved = resolved.len(),
            "resolved readings against reference table"
        );

        if resolved.len() < REQUIRED_REFERENCE_POINTS {
            return Err(PositioningError::InsufficientReferencePoints {
                available: resolved.len(),
                required: REQUIRED_REFERENCE_POINTS,
                resolved_ids: resolved.into_iter().map(|r| r.point.id).collect(),
            });
        }

        resolved.truncate(REQUIRED_REFERENCE_POINTS);
        <[ResolvedReading; 3]>::try_from(resolved).map_err(|rest| {
            PositioningError::InsufficientReferencePoints {
                available: rest.len(),
                required: REQUIRED_REFERENCE_POINTS,
                resolved_ids: rest.into_iter().map(|r| r.point.id).collect(),
            }
        })
    }
}
