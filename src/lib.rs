//! Indoor positioning from Wi-Fi signal strength
//!
//! Signal strength readings from three access points with known coordinates
//! are converted to distances with a log-distance propagation model, then
//! intersected with a closed-form trilateration solver.

pub mod core;
pub mod algorithms;
pub mod processing;
pub mod validation;
pub mod utils;
pub mod scanner;
pub mod api;

// Re-export commonly used types
pub use core::{Anchor, Position, Reading, ReferencePoint};
pub use algorithms::{
    estimate_distance, solve_trilateration, GeometryQuality, Pivot, PivotStrategy, PropagationModel,
    Solution, SolverConfig, TrilaterationSolver,
};
pub use validation::{PositioningError, PositioningResult, ReadingSelector};
pub use utils::{ConfigError, ConfigurationManager, PositioningConfig, ReferenceTable};
pub use scanner::{AirportScanner, MockScanner, ScanError, Scanner};
pub use api::{locate_batch, FloorPlanOverlay, Locator, OutputFormat, PositionFix, PositionFormatter};
