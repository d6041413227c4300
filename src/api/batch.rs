//! Parallel positioning of independent requests

use crate::api::blocking::Locator;
use crate::api::types::PositionFix;
use crate::core::Reading;
use crate::validation::error::PositioningResult;
use rayon::prelude::*;
use std::collections::BTreeMap;

/// Locate every request in parallel; results line up with `requests`
pub fn locate_batch(locator: &Locator, requests: &[Vec<Reading>]) -> Vec<PositioningResult<PositionFix>> {
    requests
        .par_iter()
        .map(|readings| locator.locate(readings))
        .collect()
}

/// Outcome counts for a batch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    pub succeeded: usize,
    /// Failures keyed by error kind
    pub failed: BTreeMap<&'static str, usize>,
}

impl BatchSummary {
    pub fn from_results(results: &[PositioningResult<PositionFix>]) -> Self {
        let mut summary = Self::default();
        for result in results {
            match result {
                Ok(_) => summary.succeeded += 1,
                Err(e) => *summary.failed.entry(e.kind_name()).or_insert(0) += 1,
            }
        }
        summary
    }

    pub fn total(&self) -> usize {
        self.succeeded + self.failed.values().sum::<usize>()
    }
}
