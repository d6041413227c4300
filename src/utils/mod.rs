//! Configuration, reference table and logging setup

pub mod config;
pub mod reference_table;
pub mod logging;

pub use config::{ConfigError, ConfigurationManager, OverlayConfig, PositioningConfig};
pub use reference_table::{normalize_id, ReferenceTable};
