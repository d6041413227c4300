//! Error taxonomy for the positioning pipeline

use crate::algorithms::trilateration::Pivot;
use crate::core::Position;
use crate::scanner::ScanError;
use crate::utils::config::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Result type for positioning operations
pub type PositioningResult<T> = Result<T, PositioningError>;

/// Solver denominator that fell inside the degeneracy epsilon
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Denominator {
    /// `p3.x - p2.x`, used to back-substitute `x`
    PivotColumn,
    /// `(p1.y - p2.y)(p3.x - p2.x) - (p3.y - p2.y)(p1.x - p2.x)`
    Determinant,
}

impl fmt::Display for Denominator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Denominator::PivotColumn => write!(f, "pivot column p3.x - p2.x"),
            Denominator::Determinant => write!(f, "determinant"),
        }
    }
}

/// Solver input that failed the finiteness check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputField {
    Coordinate { point: usize },
    Distance { point: usize },
}

impl fmt::Display for InputField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputField::Coordinate { point } => write!(f, "coordinate of p{}", point),
            InputField::Distance { point } => write!(f, "distance d{}", point),
        }
    }
}

/// Failures of a positioning run
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PositioningError {
    /// Fewer resolvable readings than the solver needs
    #[error("insufficient reference points: {available} resolvable, {required} required")]
    InsufficientReferencePoints {
        available: usize,
        required: usize,
        resolved_ids: Vec<String>,
    },

    /// Reference points are collinear or the pivot column vanishes
    #[error(
        "degenerate geometry (pivot {pivot}): {denominator} = {value:e} for points {}{}",
        describe_positions(.positions),
        describe_ids(.reference_ids)
    )]
    DegenerateGeometry {
        denominator: Denominator,
        value: f64,
        pivot: Pivot,
        /// Reference positions in the caller's order
        positions: [Position; 3],
        /// Filled in by the pipeline; empty when the solver is called directly
        reference_ids: Vec<String>,
    },

    /// Non-finite or negative value at solver entry
    #[error("invalid input: {field} = {value}")]
    InvalidInput { field: InputField, value: f64 },

    #[error(transparent)]
    Configuration(#[from] ConfigError),

    #[error(transparent)]
    Scan(#[from] ScanError),
}

fn describe_positions(positions: &[Position; 3]) -> String {
    positions
        .iter()
        .map(|p| p.to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe_ids(ids: &[String]) -> String {
    if ids.is_empty() {
        String::new()
    } else {
        format!(" [{}]", ids.join(", "))
    }
}

impl PositioningError {
    /// Attach reference identifiers to a geometry error raised by the solver
    pub fn with_reference_ids(self, ids: &[String]) -> Self {
        match self {
            PositioningError::DegenerateGeometry {
                denominator,
                value,
                pivot,
                positions,
                ..
            } => PositioningError::DegenerateGeometry {
                denominator,
                value,
                pivot,
                positions,
                reference_ids: ids.to_vec(),
            },
            other => other,
        }
    }

    /// Whether the caller can reasonably retry (another triple, another scan)
    pub fn is_recoverable(&self) -> bool {
        match self {
            PositioningError::InsufficientReferencePoints { .. } => true,
            PositioningError::DegenerateGeometry { .. } => true,
            PositioningError::InvalidInput { .. } => false,
            PositioningError::Configuration(_) => false,
            PositioningError::Scan(e) => e.is_recoverable(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            PositioningError::InsufficientReferencePoints { .. } => "InsufficientReferencePoints",
            PositioningError::DegenerateGeometry { .. } => "DegenerateGeometry",
            PositioningError::InvalidInput { .. } => "InvalidInput",
            PositioningError::Configuration(_) => "Configuration",
            PositioningError::Scan(_) => "Scan",
        }
    }
}
