//! Common API types and data structures

use crate::algorithms::gdop::{horizontal_dop, GeometryQuality};
use crate::algorithms::trilateration::{Pivot, Solution};
use crate::core::{Anchor, Position};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Result of one positioning run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionFix {
    /// Estimated device position
    pub position: Position,
    /// The three anchors used, strongest signal first
    pub anchors: [Anchor; 3],
    /// Pivot that produced the solution
    pub pivot: Pivot,
    /// `|‖position - anchor‖ - distance|` per anchor (meters)
    pub residuals: [f64; 3],
    /// Horizontal dilution of precision; `None` when the geometry is singular
    pub hdop: Option<f64>,
    pub geometry_quality: GeometryQuality,
}

impl PositionFix {
    /// Assemble a fix from the solver output and the anchors it was given
    pub fn new(solution: Solution, anchors: [Anchor; 3]) -> Self {
        let position = solution.position;
        let residuals = anchors
            .each_ref()
            .map(|anchor| (position.distance_to(&anchor.position) - anchor.distance).abs());

        let anchor_positions: Vec<Position> = anchors.iter().map(|a| a.position).collect();
        let dop = horizontal_dop(&anchor_positions, position);

        Self {
            position,
            anchors,
            pivot: solution.pivot,
            residuals,
            hdop: dop.is_finite().then_some(dop),
            geometry_quality: GeometryQuality::from_dop(dop),
        }
    }

    /// Largest range residual; a large value means the distance estimates disagree
    pub fn max_residual(&self) -> f64 {
        self.residuals.iter().copied().fold(0.0, f64::max)
    }

    pub fn anchor_ids(&self) -> Vec<&str> {
        self.anchors.iter().map(|a| a.id.as_str()).collect()
    }
}

/// Output format for position fixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable multi-line report
    #[default]
    Text,
    Json,
    /// One row per fix, with a header
    Csv,
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "csv" => Ok(OutputFormat::Csv),
            other => Err(format!("unknown output format '{}' (expected text, json or csv)", other)),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::Csv => "csv",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn anchor(id: &str, x: f64, y: f64, distance: f64) -> Anchor {
        Anchor {
            id: id.to_string(),
            position: Position::new(x, y),
            rssi: -50.0,
            distance,
        }
    }

    #[test]
    fn test_fix_residuals_and_quality() {
        let solution = Solution {
            position: Position::new(3.0, 4.0),
            pivot: Pivot::Second,
        };
        let anchors = [
            anchor("a", 0.0, 0.0, 5.0),
            anchor("b", 10.0, 0.0, 65f64.sqrt()),
            anchor("c", 0.0, 10.0, 7.0),
        ];

        let fix = PositionFix::new(solution, anchors);
        assert!(fix.residuals[0] < 1e-12);
        assert!(fix.residuals[1] < 1e-12);
        assert!((fix.residuals[2] - (7.0 - 45f64.sqrt())).abs() < 1e-12);
        assert!((fix.max_residual() - fix.residuals[2]).abs() < 1e-15);
        assert!(fix.hdop.is_some());
        assert!(fix.geometry_quality.is_acceptable());
        assert_eq!(fix.anchor_ids(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_fix_json_shape() {
        let solution = Solution {
            position: Position::new(1.0, 2.0),
            pivot: Pivot::Third,
        };
        let anchors = [
            anchor("a", 0.0, 0.0, 1.0),
            anchor("b", 4.0, 0.0, 1.0),
            anchor("c", 0.0, 4.0, 1.0),
        ];
        let fix = PositionFix::new(solution, anchors);

        let value = serde_json::to_value(&fix).unwrap();
        assert_eq!(value["position"]["x"], 1.0);
        assert_eq!(value["pivot"], "third");
        assert_eq!(value["anchors"].as_array().unwrap().len(), 3);

        let back: PositionFix = serde_json::from_value(value).unwrap();
        assert_eq!(back, fix);
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("JSON".parse::<OutputFormat>(), Ok(OutputFormat::Json));
        assert_eq!("csv".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert!("xml".parse::<OutputFormat>().is_err());
        assert_eq!(OutputFormat::default().to_string(), "text");
    }
}
