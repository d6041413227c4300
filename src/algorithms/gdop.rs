//! Dilution of precision for a three-anchor fix
//!
//! The geometry matrix `H` has one row per anchor: the unit vector from the
//! estimated position towards that anchor. `sqrt(trace((HᵀH)⁻¹))` scales range
//! error into position error; wide, well-spread triangles keep it near 1.

use crate::core::Position;
use nalgebra::{Matrix2, Vector2};
use serde::{Deserialize, Serialize};

/// Geometry quality assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GeometryQuality {
    /// DOP < 2.0
    Excellent,
    /// DOP < 5.0
    Good,
    /// DOP < 10.0
    Acceptable,
    /// DOP >= 10.0
    Poor,
    /// Singular geometry matrix
    Degenerate,
}

impl GeometryQuality {
    pub fn from_dop(dop: f64) -> Self {
        if dop < 2.0 {
            GeometryQuality::Excellent
        } else if dop < 5.0 {
            GeometryQuality::Good
        } else if dop < 10.0 {
            GeometryQuality::Acceptable
        } else if dop.is_finite() {
            GeometryQuality::Poor
        } else {
            GeometryQuality::Degenerate
        }
    }

    pub fn is_acceptable(&self) -> bool {
        matches!(
            self,
            GeometryQuality::Excellent | GeometryQuality::Good | GeometryQuality::Acceptable
        )
    }
}

/// Horizontal dilution of precision at `receiver`; infinite when singular
pub fn horizontal_dop(anchors: &[Position], receiver: Position) -> f64 {
    let receiver = receiver.to_vector();
    let mut normal = Matrix2::<f64>::zeros();

    for anchor in anchors {
        let diff = anchor.to_vector() - receiver;
        let distance = diff.norm();

        // Receiver sitting on an anchor contributes no direction
        if distance > 1e-10 {
            let unit: Vector2<f64> = diff / distance;
            normal += unit * unit.transpose();
        }
    }

    match normal.try_inverse() {
        Some(covariance) if covariance.trace() >= 0.0 => covariance.trace().sqrt(),
        _ => f64::INFINITY,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_symmetric_geometry_has_low_dop() {
        // Equilateral triangle around the receiver: HᵀH = 1.5·I
        let anchors: Vec<Position> = (0..3)
            .map(|k| {
                let angle = 2.0 * std::f64::consts::PI * k as f64 / 3.0;
                Position::new(10.0 * angle.cos(), 10.0 * angle.sin())
            })
            .collect();

        let dop = horizontal_dop(&anchors, Position::origin());
        assert!((dop - (4.0f64 / 3.0).sqrt()).abs() < 1e-9);
        assert_eq!(GeometryQuality::from_dop(dop), GeometryQuality::Excellent);
    }

    #[test]
    fn test_narrow_geometry_has_high_dop() {
        let anchors = [
            Position::new(0.0, 0.0),
            Position::new(10.0, 0.0),
            Position::new(20.0, 0.05),
        ];
        let dop = horizontal_dop(&anchors, Position::new(50.0, 0.0));
        assert!(dop > 10.0);
        assert!(!GeometryQuality::from_dop(dop).is_acceptable());
    }

    #[test]
    fn test_collinear_directions_are_degenerate() {
        let anchors = [
            Position::new(1.0, 0.0),
            Position::new(2.0, 0.0),
            Position::new(3.0, 0.0),
        ];
        let dop = horizontal_dop(&anchors, Position::origin());
        assert!(dop.is_infinite());
        assert_eq!(GeometryQuality::from_dop(dop), GeometryQuality::Degenerate);
    }

    #[test]
    fn test_quality_thresholds() {
        assert_eq!(GeometryQuality::from_dop(1.99), GeometryQuality::Excellent);
        assert_eq!(GeometryQuality::from_dop(2.0), GeometryQuality::Good);
        assert_eq!(GeometryQuality::from_dop(7.5), GeometryQuality::Acceptable);
        assert_eq!(GeometryQuality::from_dop(10.0), GeometryQuality::Poor);
        assert_eq!(GeometryQuality::from_dop(f64::NAN), GeometryQuality::Degenerate);
    }
}
