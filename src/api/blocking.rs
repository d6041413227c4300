//! Synchronous positioning pipeline: select, estimate, solve

use crate::algorithms::propagation::PropagationModel;
use crate::algorithms::trilateration::{SolverConfig, TrilaterationSolver};
use crate::api::types::PositionFix;
use crate::core::{Anchor, Reading};
use crate::scanner::Scanner;
use crate::utils::config::{ConfigError, PositioningConfig};
use crate::utils::reference_table::ReferenceTable;
use crate::validation::data::ReadingSelector;
use crate::validation::error::PositioningResult;
use tracing::{debug, info, warn};

/// Positioning pipeline over an immutable deployment configuration
#[derive(Debug, Clone)]
pub struct Locator {
    model: PropagationModel,
    solver: TrilaterationSolver,
    table: ReferenceTable,
    selector: ReadingSelector,
}

impl Locator {
    pub fn new(
        model: PropagationModel,
        solver: SolverConfig,
        table: ReferenceTable,
    ) -> Result<Self, ConfigError> {
        model.validate()?;
        solver.validate()?;
        Ok(Self {
            model,
            solver: TrilaterationSolver::new(solver),
            table,
            selector: ReadingSelector::new(),
        })
    }

    /// Build from a loaded configuration
    pub fn from_config(config: &PositioningConfig) -> Result<Self, ConfigError> {
        let table = ReferenceTable::from_points(config.reference_points.iter().cloned())?;
        Self::new(config.propagation, config.solver, table)
    }

    pub fn with_selector(mut self, selector: ReadingSelector) -> Self {
        self.selector = selector;
        self
    }

    pub fn model(&self) -> &PropagationModel {
        &self.model
    }

    pub fn table(&self) -> &ReferenceTable {
        &self.table
    }

    /// Estimate the device position from one scan's readings
    pub fn locate(&self, readings: &[Reading]) -> PositioningResult<PositionFix> {
        let selected = self.selector.select(readings, &self.table)?;

        let anchors = selected.map(|resolved| Anchor {
            distance: self.model.estimate_distance(resolved.rssi),
            id: resolved.point.id,
            position: resolved.point.position,
            rssi: resolved.rssi,
        });
        for anchor in &anchors {
            debug!(
                id = %anchor.id,
                x = anchor.position.x,
                y = anchor.position.y,
                rssi = anchor.rssi,
                distance = anchor.distance,
                "anchor"
            );
        }

        let ids: Vec<String> = anchors.iter().map(|a| a.id.clone()).collect();
        let references = anchors.each_ref().map(|a| (a.position, a.distance));
        let solution = self
            .solver
            .solve(references)
            .map_err(|e| e.with_reference_ids(&ids))?;

        let fix = PositionFix::new(solution, anchors);
        if !fix.geometry_quality.is_acceptable() {
            warn!(quality = ?fix.geometry_quality, hdop = ?fix.hdop, "weak anchor geometry");
        }
        info!(
            x = fix.position.x,
            y = fix.position.y,
            pivot = %fix.pivot,
            max_residual = fix.max_residual(),
            "position fix"
        );
        Ok(fix)
    }

    /// Run one scan and locate from its readings
    pub fn locate_with_scanner(&self, scanner: &mut dyn Scanner) -> PositioningResult<PositionFix> {
        let readings = scanner.scan()?;
        debug!(scanner = scanner.name(), readings = readings.len(), "scan received");
        self.locate(&readings)
    }
}
