//! Core positioning algorithms

pub mod propagation;
pub mod trilateration;
pub mod gdop;

pub use propagation::{estimate_distance, PropagationModel};
pub use trilateration::{solve_trilateration, Pivot, PivotStrategy, Solution, SolverConfig, TrilaterationSolver};
pub use gdop::{horizontal_dop, GeometryQuality};
