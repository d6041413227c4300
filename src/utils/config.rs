use crate::algorithms::propagation::PropagationModel;
use crate::algorithms::trilateration::{PivotStrategy, SolverConfig};
use crate::core::{ReferencePoint, IDEAL_PATH_LOSS_EXPONENT, REQUIRED_REFERENCE_POINTS};
use crate::utils::reference_table::{normalize_id, ReferenceTable};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

/// Deployment configuration: calibration, solver settings and the reference table
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PositioningConfig {
    /// Propagation model calibration for this environment
    pub propagation: PropagationModel,
    /// Trilateration solver settings
    pub solver: SolverConfig,
    /// Access points with known coordinates
    pub reference_points: Vec<ReferencePoint>,
    /// Floor-plan overlay rendering
    pub overlay: OverlayConfig,
}

/// Floor-plan overlay rendering settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Scale from building meters to image pixels
    pub pixels_per_meter: f64,
    /// Diameter of access point markers (pixels)
    pub reference_marker_px: f64,
    /// Diameter of the device marker (pixels)
    pub device_marker_px: f64,
    pub reference_color: [u8; 3],
    pub device_color: [u8; 3],
    /// Background floor-plan image referenced from the SVG
    pub floor_plan_image: Option<String>,
    /// Canvas size in pixels; derived from the markers when absent
    pub canvas_px: Option<(u32, u32)>,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            pixels_per_meter: 100.0,
            reference_marker_px: 50.0,
            device_marker_px: 100.0,
            reference_color: [233, 56, 78],
            device_color: [78, 56, 233],
            floor_plan_image: None,
            canvas_px: None,
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("Invalid parameter '{parameter}' = '{value}': {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },
    #[error("Duplicate reference point identifier: {id}")]
    DuplicateReference { id: String },
    #[error("I/O error: {message}")]
    IoError { message: String },
    #[error("Serialization error: {message}")]
    SerializationError { message: String },
    #[error("Geometry validation error: {reason}")]
    GeometryValidation { reason: String },
}

/// Outcome of validating a configuration
#[derive(Debug)]
pub struct ValidationReport {
    pub is_valid: bool,
    pub errors: Vec<ConfigError>,
    pub warnings: Vec<String>,
}

impl ValidationReport {
    fn into_result(self) -> Result<Vec<String>, ConfigError> {
        match self.errors.into_iter().next() {
            Some(error) => Err(error),
            None => Ok(self.warnings),
        }
    }
}

/// Loads, validates, edits and persists a [`PositioningConfig`]
pub struct ConfigurationManager {
    config: PositioningConfig,
    config_file_path: Option<String>,
    is_modified: bool,
}

impl ConfigurationManager {
    /// Create a configuration manager with default settings and no reference points
    pub fn new() -> Self {
        Self {
            config: PositioningConfig::default(),
            config_file_path: None,
            is_modified: false,
        }
    }

    /// Wrap an already-built configuration after validating it
    pub fn with_config(config: PositioningConfig) -> Result<Self, ConfigError> {
        let manager = Self::new();
        manager.validate_config(&config).into_result()?;
        Ok(Self {
            config,
            ..manager
        })
    }

    /// Create configuration manager and load from file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut manager = Self::new();
        manager.load_from_file(path)?;
        Ok(manager)
    }

    pub fn config(&self) -> &PositioningConfig {
        &self.config
    }

    pub fn is_modified(&self) -> bool {
        self.is_modified
    }

    /// Load configuration from a JSON file; the current configuration is kept on failure
    pub fn load_from_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            message: format!("Failed to read config file '{}': {}", path_str, e),
        })?;

        let config: PositioningConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                message: format!("Failed to parse config file '{}': {}", path_str, e),
            })?;

        let warnings = self.validate_config(&config).into_result()?;
        for warning in &warnings {
            warn!(path = %path_str, "{}", warning);
        }
        debug!(
            path = %path_str,
            reference_points = config.reference_points.len(),
            rssi0 = config.propagation.rssi0,
            n = config.propagation.n,
            "configuration loaded"
        );

        self.config = config;
        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save configuration to a JSON file
    pub fn save_to_file<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        let content = serde_json::to_string_pretty(&self.config).map_err(|e| {
            ConfigError::SerializationError {
                message: format!("Failed to serialize config: {}", e),
            }
        })?;

        fs::write(&path, content).map_err(|e| ConfigError::IoError {
            message: format!("Failed to write config file '{}': {}", path_str, e),
        })?;

        self.config_file_path = Some(path_str);
        self.is_modified = false;
        Ok(())
    }

    /// Save to the currently loaded file path
    pub fn save(&mut self) -> Result<(), ConfigError> {
        match self.config_file_path.clone() {
            Some(path) => self.save_to_file(path),
            None => Err(ConfigError::IoError {
                message: "No file path set for saving configuration".to_string(),
            }),
        }
    }

    /// Replace the propagation model, returning the previous one
    pub fn set_propagation_model(
        &mut self,
        model: PropagationModel,
    ) -> Result<PropagationModel, ConfigError> {
        model.validate()?;
        let old = std::mem::replace(&mut self.config.propagation, model);
        self.is_modified = true;
        Ok(old)
    }

    /// Replace the solver settings, returning the previous ones
    pub fn set_solver_config(&mut self, solver: SolverConfig) -> Result<SolverConfig, ConfigError> {
        solver.validate()?;
        let old = std::mem::replace(&mut self.config.solver, solver);
        self.is_modified = true;
        Ok(old)
    }

    /// Add a reference point; identifiers must stay unique
    pub fn add_reference_point(&mut self, point: ReferencePoint) -> Result<(), ConfigError> {
        let mut points = self.config.reference_points.clone();
        points.push(point);
        ReferenceTable::from_points(points.clone())?;

        self.config.reference_points = points;
        self.is_modified = true;
        Ok(())
    }

    pub fn remove_reference_point(&mut self, id: &str) -> Option<ReferencePoint> {
        let index = self
            .config
            .reference_points
            .iter()
            .position(|p| normalize_id(&p.id) == normalize_id(id))?;
        self.is_modified = true;
        Some(self.config.reference_points.remove(index))
    }

    /// Lookup table over the configured reference points
    pub fn reference_table(&self) -> Result<ReferenceTable, ConfigError> {
        ReferenceTable::from_points(self.config.reference_points.iter().cloned())
    }

    /// Validate a complete configuration
    pub fn validate_config(&self, config: &PositioningConfig) -> ValidationReport {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = config.propagation.validate() {
            errors.push(e);
        } else if config.propagation.n < IDEAL_PATH_LOSS_EXPONENT {
            warnings.push(format!(
                "Path-loss exponent {} is below the free-space value {}",
                config.propagation.n, IDEAL_PATH_LOSS_EXPONENT
            ));
        }

        if let Err(e) = config.solver.validate() {
            errors.push(e);
        }

        if let Err(e) = validate_overlay(&config.overlay) {
            errors.push(e);
        }

        match ReferenceTable::from_points(config.reference_points.iter().cloned()) {
            Err(e) => errors.push(e),
            Ok(table) if table.len() < REQUIRED_REFERENCE_POINTS => {
                errors.push(ConfigError::GeometryValidation {
                    reason: format!(
                        "Only {} reference points configured, but {} required",
                        table.len(),
                        REQUIRED_REFERENCE_POINTS
                    ),
                });
            }
            Ok(_) => warnings.extend(geometry_warnings(config)),
        }

        ValidationReport {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }
}

impl Default for ConfigurationManager {
    fn default() -> Self {
        Self::new()
    }
}

fn validate_overlay(overlay: &OverlayConfig) -> Result<(), ConfigError> {
    let sizes = [
        ("overlay.pixels_per_meter", overlay.pixels_per_meter),
        ("overlay.reference_marker_px", overlay.reference_marker_px),
        ("overlay.device_marker_px", overlay.device_marker_px),
    ];
    for (parameter, value) in sizes {
        if !value.is_finite() || value <= 0.0 {
            return Err(ConfigError::InvalidParameter {
                parameter: parameter.to_string(),
                value: value.to_string(),
                reason: "Must be finite and positive".to_string(),
            });
        }
    }
    Ok(())
}

/// Triples the solver will reject, reported up front
fn geometry_warnings(config: &PositioningConfig) -> Vec<String> {
    let points = &config.reference_points;
    let epsilon = config.solver.degeneracy_epsilon;
    let mut warnings = Vec::new();

    for i in 0..points.len() {
        for j in (i + 1)..points.len() {
            for k in (j + 1)..points.len() {
                let (a, b, c) = (points[i].position, points[j].position, points[k].position);
                let doubled_area = (b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y);
                if doubled_area.abs() <= epsilon {
                    warnings.push(format!(
                        "Reference points {}, {} and {} are collinear; this triple cannot be solved",
                        points[i].id, points[j].id, points[k].id
                    ));
                }
            }
        }
    }

    if let PivotStrategy::Fixed(pivot) = config.solver.pivot {
        for i in 0..points.len() {
            for j in (i + 1)..points.len() {
                if (points[i].position.x - points[j].position.x).abs() <= epsilon {
                    warnings.push(format!(
                        "Reference points {} and {} share x = {}; pivot {} rejects triples that \
                         place them in adjacent slots after it, consider the fallback pivot strategy",
                        points[i].id, points[j].id, points[i].position.x, pivot
                    ));
                }
            }
        }
    }

    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::trilateration::Pivot;
    use crate::core::Position;
    use tempfile::TempDir;

    fn office_points() -> Vec<ReferencePoint> {
        vec![
            ReferencePoint::new("aa:bb:cc:00:00:01", Position::new(6.0, 6.0)),
            ReferencePoint::new("aa:bb:cc:00:00:02", Position::new(15.0, 5.7)),
            ReferencePoint::new("aa:bb:cc:00:00:03", Position::new(10.0, 10.0)),
        ]
    }

    fn office_config() -> PositioningConfig {
        PositioningConfig {
            reference_points: office_points(),
            ..Default::default()
        }
    }

    #[test]
    fn test_default_config() {
        let config = PositioningConfig::default();
        assert_eq!(config.propagation.rssi0, -32.0);
        assert_eq!(config.propagation.n, 28.0);
        assert_eq!(config.solver.pivot, PivotStrategy::Fixed(Pivot::Second));
        assert_eq!(config.overlay.pixels_per_meter, 100.0);
        assert!(config.reference_points.is_empty());
    }

    #[test]
    fn test_default_config_needs_reference_points() {
        let manager = ConfigurationManager::new();
        let report = manager.validate_config(manager.config());
        assert!(!report.is_valid);
        assert!(matches!(report.errors[0], ConfigError::GeometryValidation { .. }));
    }

    #[test]
    fn test_office_config_is_valid() {
        let manager = ConfigurationManager::new();
        let report = manager.validate_config(&office_config());
        assert!(report.is_valid, "{:?}", report.errors);
        assert!(report.warnings.is_empty(), "{:?}", report.warnings);
    }

    #[test]
    fn test_zero_exponent_rejected() {
        let mut config = office_config();
        config.propagation.n = 0.0;

        let report = ConfigurationManager::new().validate_config(&config);
        assert!(!report.is_valid);
        assert!(ConfigurationManager::with_config(config).is_err());
    }

    #[test]
    fn test_low_exponent_warns() {
        let mut config = office_config();
        config.propagation.n = 15.0;

        let report = ConfigurationManager::new().validate_config(&config);
        assert!(report.is_valid);
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("free-space"));
    }

    #[test]
    fn test_geometry_warnings() {
        let mut config = office_config();
        config.reference_points.push(ReferencePoint::new("collinear", Position::new(24.0, 5.4)));
        config.reference_points.push(ReferencePoint::new("same-column", Position::new(6.0, 20.0)));

        let report = ConfigurationManager::new().validate_config(&config);
        assert!(report.is_valid);
        assert!(report.warnings.iter().any(|w| w.contains("collinear")));
        assert!(report.warnings.iter().any(|w| w.contains("share x = 6")));

        config.solver.pivot = PivotStrategy::Fallback;
        let report = ConfigurationManager::new().validate_config(&config);
        assert!(!report.warnings.iter().any(|w| w.contains("share x")));
    }

    #[test]
    fn test_invalid_overlay_rejected() {
        let mut config = office_config();
        config.overlay.pixels_per_meter = 0.0;

        let report = ConfigurationManager::new().validate_config(&config);
        match &report.errors[..] {
            [ConfigError::InvalidParameter { parameter, .. }] => {
                assert_eq!(parameter, "overlay.pixels_per_meter");
            }
            other => panic!("Expected one InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_point_editing() {
        let mut manager = ConfigurationManager::with_config(office_config()).unwrap();
        assert!(!manager.is_modified());

        let duplicate = ReferencePoint::new("AA:BB:CC:00:00:01", Position::new(0.0, 0.0));
        assert!(matches!(
            manager.add_reference_point(duplicate),
            Err(ConfigError::DuplicateReference { .. })
        ));
        assert!(!manager.is_modified());

        manager
            .add_reference_point(ReferencePoint::new("aa:bb:cc:00:00:04", Position::new(2.0, 12.0)))
            .unwrap();
        assert!(manager.is_modified());
        assert_eq!(manager.reference_table().unwrap().len(), 4);

        let removed = manager.remove_reference_point("AA:BB:CC:00:00:04").unwrap();
        assert_eq!(removed.position, Position::new(2.0, 12.0));
        assert!(manager.remove_reference_point("aa:bb:cc:00:00:04").is_none());
    }

    #[test]
    fn test_remove_uses_normalized_identifiers() {
        let mut manager = ConfigurationManager::with_config(office_config()).unwrap();
        manager
            .add_reference_point(ReferencePoint::new(" Lobby-AP ", Position::new(2.0, 12.0)))
            .unwrap();
        manager
            .add_reference_point(ReferencePoint::new("AA:BB:CC:00:00:0A", Position::new(4.0, 1.0)))
            .unwrap();

        assert!(manager.remove_reference_point("lobby-ap").is_some());
        assert!(manager.remove_reference_point("aa:bb:cc:0:0:a").is_some());
        assert_eq!(manager.config().reference_points.len(), 3);
    }

    #[test]
    fn test_runtime_parameter_adjustment() {
        let mut manager = ConfigurationManager::with_config(office_config()).unwrap();

        let old = manager.set_propagation_model(PropagationModel::free_space(-40.0)).unwrap();
        assert_eq!(old.n, 28.0);
        assert_eq!(manager.config().propagation.n, 20.0);

        let invalid = PropagationModel { rssi0: -40.0, n: 0.0 };
        assert!(manager.set_propagation_model(invalid).is_err());
        assert_eq!(manager.config().propagation.n, 20.0);

        let solver = SolverConfig {
            pivot: PivotStrategy::Fallback,
            ..Default::default()
        };
        manager.set_solver_config(solver).unwrap();
        assert_eq!(manager.config().solver.pivot, PivotStrategy::Fallback);
    }

    #[test]
    fn test_config_file_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("office.json");

        let mut config = office_config();
        config.solver.pivot = PivotStrategy::Fallback;
        config.overlay.floor_plan_image = Some("floor_plan.png".to_string());

        let mut manager = ConfigurationManager::with_config(config.clone()).unwrap();
        manager.save_to_file(&path).unwrap();

        let loaded = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(loaded.config(), &config);
        assert!(!loaded.is_modified());
    }

    #[test]
    fn test_partial_config_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("minimal.json");
        fs::write(
            &path,
            r#"{
                "reference_points": [
                    { "id": "a", "position": { "x": 0.0, "y": 0.0 } },
                    { "id": "b", "position": { "x": 10.0, "y": 0.0 } },
                    { "id": "c", "position": { "x": 0.0, "y": 10.0 } }
                ],
                "propagation": { "rssi0": -40.0, "n": 20.0 }
            }"#,
        )
        .unwrap();

        let manager = ConfigurationManager::from_file(&path).unwrap();
        assert_eq!(manager.config().propagation, PropagationModel::free_space(-40.0));
        assert_eq!(manager.config().solver, SolverConfig::default());
        assert_eq!(manager.config().overlay, OverlayConfig::default());
    }

    #[test]
    fn test_load_failures_keep_current_config() {
        let dir = TempDir::new().unwrap();
        let mut manager = ConfigurationManager::with_config(office_config()).unwrap();

        let missing = dir.path().join("missing.json");
        assert!(matches!(manager.load_from_file(&missing), Err(ConfigError::IoError { .. })));

        let garbage = dir.path().join("garbage.json");
        fs::write(&garbage, "{ not json").unwrap();
        assert!(matches!(
            manager.load_from_file(&garbage),
            Err(ConfigError::SerializationError { .. })
        ));

        let invalid = dir.path().join("invalid.json");
        fs::write(&invalid, r#"{ "propagation": { "rssi0": -32.0, "n": 0.0 } }"#).unwrap();
        assert!(matches!(
            manager.load_from_file(&invalid),
            Err(ConfigError::InvalidParameter { .. })
        ));

        assert_eq!(manager.config().reference_points.len(), 3);
    }

    #[test]
    fn test_shipped_office_config() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/office.json");
        let manager = ConfigurationManager::from_file(path).unwrap();

        assert_eq!(manager.config().propagation, PropagationModel::default());
        assert_eq!(manager.config().solver.pivot, PivotStrategy::Fallback);
        assert_eq!(manager.reference_table().unwrap().len(), 3);
    }

    #[test]
    fn test_save_without_path_fails() {
        let mut manager = ConfigurationManager::new();
        assert!(matches!(manager.save(), Err(ConfigError::IoError { .. })));
    }
}
