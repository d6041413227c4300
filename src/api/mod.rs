//! Positioning API
//!
//! The blocking [`Locator`] runs one scan through selection, distance
//! estimation and the solver; [`locate_batch`] spreads independent requests
//! over worker threads. Formatting and overlay rendering consume the
//! resulting [`PositionFix`].

pub mod batch;
pub mod blocking;
pub mod formatting;
pub mod overlay;
pub mod types;

pub use batch::{locate_batch, BatchSummary};
pub use blocking::Locator;
pub use formatting::{csv_header, PositionFormatter};
pub use overlay::{FloorPlanOverlay, MarkerBox};
pub use types::{OutputFormat, PositionFix};
