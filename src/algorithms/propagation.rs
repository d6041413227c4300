//! Log-distance signal propagation model
//!
//! Received power falls off with distance; in dB form the relation is
//! `rssi = rssi0 - n·log10(d)`, where `rssi0` is the strength observed at
//! 1 m and `n` the path-loss exponent. Free space gives `n = 20`
//! (inverse square); indoor multipath and walls push it higher.

use crate::core::{DEFAULT_RSSI_AT_ONE_METER, IDEAL_PATH_LOSS_EXPONENT, INDOOR_PATH_LOSS_EXPONENT};
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Calibration constants of the propagation model for one deployment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropagationModel {
    /// Signal strength at unit distance (dBm)
    pub rssi0: f64,
    /// Path-loss exponent (dB per decade of distance)
    pub n: f64,
}

impl Default for PropagationModel {
    fn default() -> Self {
        Self {
            rssi0: DEFAULT_RSSI_AT_ONE_METER,
            n: INDOOR_PATH_LOSS_EXPONENT,
        }
    }
}

impl PropagationModel {
    /// Create a validated model
    pub fn new(rssi0: f64, n: f64) -> Result<Self, ConfigError> {
        let model = Self { rssi0, n };
        model.validate()?;
        Ok(model)
    }

    /// Model with the ideal free-space exponent
    pub fn free_space(rssi0: f64) -> Self {
        Self {
            rssi0,
            n: IDEAL_PATH_LOSS_EXPONENT,
        }
    }

    /// Reject parameters that would make the estimator undefined or non-monotonic
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.rssi0.is_finite() {
            return Err(ConfigError::InvalidParameter {
                parameter: "propagation.rssi0".to_string(),
                value: self.rssi0.to_string(),
                reason: "Reference signal strength must be finite".to_string(),
            });
        }

        if !self.n.is_finite() || self.n <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "propagation.n".to_string(),
                value: self.n.to_string(),
                reason: "Path-loss exponent must be finite and positive".to_string(),
            });
        }

        Ok(())
    }

    /// Estimated distance (meters) to an emitter observed at `rssi`
    pub fn estimate_distance(&self, rssi: f64) -> f64 {
        10f64.powf(-(rssi - self.rssi0) / self.n)
    }

    /// Signal strength the model predicts at `distance` meters
    pub fn expected_rssi(&self, distance: f64) -> f64 {
        self.rssi0 - self.n * distance.log10()
    }
}

/// Convert a measured signal strength to an estimated distance.
///
/// `distance = 10 ^ (-(rssi - rssi0) / n)`. Non-finite `rssi` produces a
/// non-finite distance, which the solver rejects downstream.
pub fn estimate_distance(rssi: f64, model: &PropagationModel) -> f64 {
    model.estimate_distance(rssi)
}
