//! Closed-form trilateration from three reference points
//!
//! Each reference point `pi` with estimated range `di` constrains the device to
//! the circle `(x - pi.x)² + (y - pi.y)² = di²`. Subtracting the pivot's circle
//! from the other two cancels the quadratic terms and leaves a 2x2 linear
//! system, which is solved directly:
//!
//! ```text
//! va  = [(d2² - d3²) - (p2.x² - p3.x²) - (p2.y² - p3.y²)] / 2
//! vb  = [(d2² - d1²) - (p2.x² - p1.x²) - (p2.y² - p1.y²)] / 2
//! det = (p1.y - p2.y)(p3.x - p2.x) - (p3.y - p2.y)(p1.x - p2.x)
//! y   = [vb(p3.x - p2.x) - va(p1.x - p2.x)] / det
//! x   = [va - y(p3.y - p2.y)] / (p3.x - p2.x)
//! ```
//!
//! `p2` is the pivot. `det` is twice the signed area of the triangle and does
//! not depend on the pivot; `p3.x - p2.x` does, so a fixed pivot rejects some
//! valid triangles (two points sharing an `x` coordinate). The `Fallback`
//! strategy rotates the pivot until that denominator is usable.

use crate::core::{Position, DEFAULT_DEGENERACY_EPSILON};
use crate::utils::config::ConfigError;
use crate::validation::error::{Denominator, InputField, PositioningError, PositioningResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Which of the three reference points plays the role of `p2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pivot {
    First,
    Second,
    Third,
}

impl Pivot {
    /// Order tried by [`PivotStrategy::Fallback`]
    pub const FALLBACK_ORDER: [Pivot; 3] = [Pivot::Second, Pivot::Third, Pivot::First];

    /// 1-based index of the pivot in the caller's ordering
    pub fn number(self) -> usize {
        match self {
            Pivot::First => 1,
            Pivot::Second => 2,
            Pivot::Third => 3,
        }
    }

    /// Rotate the triple cyclically so the pivot lands in the middle slot.
    ///
    /// Cyclic rotation keeps the orientation of the triangle, so `det` keeps
    /// its sign, and each pivot pairs with a different `p3` in the column
    /// denominator.
    pub fn arrange<T: Copy>(self, items: [T; 3]) -> [T; 3] {
        let [a, b, c] = items;
        match self {
            Pivot::First => [c, a, b],
            Pivot::Second => [a, b, c],
            Pivot::Third => [b, c, a],
        }
    }
}

impl fmt::Display for Pivot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "p{}", self.number())
    }
}

/// How the solver chooses its pivot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PivotStrategy {
    /// Always pivot on the given point; degenerate denominators are errors
    Fixed(Pivot),
    /// Try pivots in [`Pivot::FALLBACK_ORDER`], keep the first that solves
    Fallback,
}

impl Default for PivotStrategy {
    fn default() -> Self {
        PivotStrategy::Fixed(Pivot::Second)
    }
}

/// Solver settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverConfig {
    /// Denominators with magnitude at or below this are treated as zero
    pub degeneracy_epsilon: f64,
    pub pivot: PivotStrategy,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            degeneracy_epsilon: DEFAULT_DEGENERACY_EPSILON,
            pivot: PivotStrategy::default(),
        }
    }
}

impl SolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.degeneracy_epsilon.is_finite() || self.degeneracy_epsilon < 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: "solver.degeneracy_epsilon".to_string(),
                value: self.degeneracy_epsilon.to_string(),
                reason: "Epsilon must be finite and non-negative".to_string(),
            });
        }
        Ok(())
    }
}

/// Solver output: the estimate and the pivot that produced it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Solution {
    pub position: Position,
    pub pivot: Pivot,
}

/// Closed-form three-point trilateration engine
#[derive(Debug, Clone, Default)]
pub struct TrilaterationSolver {
    config: SolverConfig,
}

impl TrilaterationSolver {
    pub fn new(config: SolverConfig) -> Self {
        Self { config }
    }

    /// Solver that rotates the pivot before giving up
    pub fn with_fallback() -> Self {
        Self::new(SolverConfig {
            pivot: PivotStrategy::Fallback,
            ..Default::default()
        })
    }

    pub fn with_pivot(pivot: Pivot) -> Self {
        Self::new(SolverConfig {
            pivot: PivotStrategy::Fixed(pivot),
            ..Default::default()
        })
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Solve for the position given three `(reference position, distance)` pairs
    pub fn solve(&self, references: [(Position, f64); 3]) -> PositioningResult<Solution> {
        validate_inputs(&references)?;

        match self.config.pivot {
            PivotStrategy::Fixed(pivot) => {
                let position = self.solve_with_pivot(pivot, &references)?;
                Ok(Solution { position, pivot })
            }
            PivotStrategy::Fallback => {
                let mut first_error = None;
                for pivot in Pivot::FALLBACK_ORDER {
                    match self.solve_with_pivot(pivot, &references) {
                        Ok(position) => return Ok(Solution { position, pivot }),
                        Err(e) => {
                            debug!(%pivot, error = %e, "pivot rejected, rotating");
                            first_error.get_or_insert(e);
                        }
                    }
                }
                // FALLBACK_ORDER is non-empty, so at least one error was recorded
                Err(first_error.unwrap_or(PositioningError::DegenerateGeometry {
                    denominator: Denominator::Determinant,
                    value: 0.0,
                    pivot: Pivot::Second,
                    positions: references.map(|(p, _)| p),
                    reference_ids: Vec::new(),
                }))
            }
        }
    }

    fn solve_with_pivot(
        &self,
        pivot: Pivot,
        references: &[(Position, f64); 3],
    ) -> PositioningResult<Position> {
        let [(p1, d1), (p2, d2), (p3, d3)] = pivot.arrange(*references);
        let epsilon = self.config.degeneracy_epsilon;

        let degenerate = |denominator, value| PositioningError::DegenerateGeometry {
            denominator,
            value,
            pivot,
            positions: references.map(|(p, _)| p),
            reference_ids: Vec::new(),
        };

        let column = p3.x - p2.x;
        let det = (p1.y - p2.y) * column - (p3.y - p2.y) * (p1.x - p2.x);

        if det.abs() <= epsilon {
            return Err(degenerate(Denominator::Determinant, det));
        }
        if column.abs() <= epsilon {
            return Err(degenerate(Denominator::PivotColumn, column));
        }

        let va = ((d2 * d2 - d3 * d3) - (p2.x * p2.x - p3.x * p3.x) - (p2.y * p2.y - p3.y * p3.y)) / 2.0;
        let vb = ((d2 * d2 - d1 * d1) - (p2.x * p2.x - p1.x * p1.x) - (p2.y * p2.y - p1.y * p1.y)) / 2.0;
        debug!(%pivot, va, vb, det, "linearized trilateration system");

        let y = (vb * column - va * (p1.x - p2.x)) / det;
        let x = (va - y * (p3.y - p2.y)) / column;

        let position = Position::new(x, y);
        if !position.is_finite() {
            return Err(overflowing_distance(references));
        }
        Ok(position)
    }
}

/// Finite inputs can still overflow once squared; blame the largest range
fn overflowing_distance(references: &[(Position, f64); 3]) -> PositioningError {
    let (index, value) = references
        .iter()
        .map(|(_, distance)| *distance)
        .enumerate()
        .fold((0, f64::MIN), |best, (i, d)| if d > best.1 { (i, d) } else { best });

    PositioningError::InvalidInput {
        field: InputField::Distance { point: index + 1 },
        value,
    }
}

fn validate_inputs(references: &[(Position, f64); 3]) -> PositioningResult<()> {
    for (i, (position, distance)) in references.iter().enumerate() {
        let point = i + 1;
        for value in [position.x, position.y] {
            if !value.is_finite() {
                return Err(PositioningError::InvalidInput {
                    field: InputField::Coordinate { point },
                    value,
                });
            }
        }
        if !distance.is_finite() || *distance < 0.0 {
            return Err(PositioningError::InvalidInput {
                field: InputField::Distance { point },
                value: *distance,
            });
        }
    }
    Ok(())
}

/// Trilaterate with the default solver (pivot on `p2`, default epsilon)
pub fn solve_trilateration(
    p1: Position,
    d1: f64,
    p2: Position,
    d2: f64,
    p3: Position,
    d3: f64,
) -> PositioningResult<Position> {
    TrilaterationSolver::default()
        .solve([(p1, d1), (p2, d2), (p3, d3)])
        .map(|solution| solution.position)
}
