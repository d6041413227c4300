//! Command-line interface for RSSI indoor positioning

use clap::{Parser, Subcommand, ValueEnum};
use rssi_trilateration::api::BatchSummary;
use rssi_trilateration::processing::{parse_readings, ParseError};
use rssi_trilateration::utils::logging::init_logging;
use rssi_trilateration::{
    locate_batch, AirportScanner, ConfigError, ConfigurationManager, FloorPlanOverlay, Locator,
    OutputFormat, Position, PositionFormatter, PositioningConfig, PositioningError,
    PropagationModel, Reading, ReadingSelector,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum FormatArg {
    /// Human-readable report
    Text,
    /// Pretty-printed JSON
    Json,
    /// One CSV row per request
    Csv,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Text => OutputFormat::Text,
            FormatArg::Json => OutputFormat::Json,
            FormatArg::Csv => OutputFormat::Csv,
        }
    }
}

#[derive(Parser)]
#[command(name = "rssi-trilateration", version)]
#[command(about = "Estimate a device's indoor position from Wi-Fi signal strength", long_about = None)]
struct Args {
    /// Log intermediate values (anchors, distances, linear system)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a signal strength to an estimated distance
    Distance {
        /// Measured signal strength (dBm)
        #[arg(long, allow_negative_numbers = true)]
        rssi: f64,

        /// Take the propagation model from this configuration file
        #[arg(long, conflicts_with_all = ["rssi0", "n"])]
        config: Option<PathBuf>,

        /// Signal strength at 1 m (dBm)
        #[arg(long, allow_negative_numbers = true)]
        rssi0: Option<f64>,

        /// Path-loss exponent
        #[arg(long)]
        n: Option<f64>,
    },

    /// Locate the device from recorded readings or a live scan
    Locate {
        /// Deployment configuration (JSON)
        #[arg(long)]
        config: PathBuf,

        /// Readings file (JSON or airport listing); repeat for a batch
        #[arg(long, required_unless_present = "scan", conflicts_with = "scan")]
        readings: Vec<PathBuf>,

        /// Scan with the airport utility instead of reading files
        #[arg(long)]
        scan: bool,

        /// Path to the airport executable
        #[arg(long, requires = "scan")]
        airport: Option<PathBuf>,

        /// Ignore readings weaker than this (dBm)
        #[arg(long, allow_negative_numbers = true)]
        min_rssi: Option<f64>,

        #[arg(long, value_enum, default_value = "text")]
        format: FormatArg,

        /// Write an SVG floor-plan overlay of the fix
        #[arg(long)]
        overlay: Option<PathBuf>,
    },

    /// Render reference points and a given position as an SVG overlay
    Overlay {
        #[arg(long)]
        config: PathBuf,

        #[arg(long, allow_negative_numbers = true)]
        x: f64,

        #[arg(long, allow_negative_numbers = true)]
        y: f64,

        #[arg(long)]
        output: PathBuf,
    },

    /// Check a configuration file and report geometry warnings
    Validate {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Positioning(#[from] PositioningError),
    #[error("{}: {source}", .path.display())]
    Parse { path: PathBuf, source: ParseError },
    #[error("{}: {source}", .path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to format output: {0}")]
    Format(#[from] serde_json::Error),
    #[error("--overlay needs exactly one request, got {0}")]
    OverlayNeedsSingleRequest(usize),
}

impl CliError {
    /// 2 for positioning failures the caller may retry, 1 otherwise
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Positioning(e) if e.is_recoverable() => 2,
            _ => 1,
        }
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = init_logging(args.verbose) {
        eprintln!("warning: logging disabled: {}", e);
    }

    if let Err(e) = run(args.command) {
        error!(error = %e, "command failed");
        eprintln!("error: {}", e);
        process::exit(e.exit_code());
    }
}

fn run(command: Command) -> Result<(), CliError> {
    match command {
        Command::Distance {
            rssi,
            config,
            rssi0,
            n,
        } => {
            let model = match config {
                Some(path) => ConfigurationManager::from_file(path)?.config().propagation,
                None => {
                    let defaults = PropagationModel::default();
                    PropagationModel::new(rssi0.unwrap_or(defaults.rssi0), n.unwrap_or(defaults.n))?
                }
            };
            println!("{:.3}", model.estimate_distance(rssi));
            Ok(())
        }

        Command::Locate {
            config,
            readings,
            scan,
            airport,
            min_rssi,
            format,
            overlay,
        } => {
            let manager = ConfigurationManager::from_file(&config)?;
            let mut locator = Locator::from_config(manager.config())?;
            if let Some(min_rssi) = min_rssi {
                locator = locator.with_selector(ReadingSelector::with_min_rssi(min_rssi));
            }
            let formatter = PositionFormatter::new(format.into());

            if scan {
                let mut scanner = match airport {
                    Some(path) => AirportScanner::with_command(path, vec!["-s".to_string()]),
                    None => AirportScanner::new(),
                };
                let fix = locator.locate_with_scanner(&mut scanner)?;
                println!("{}", formatter.format_fix(&fix)?.trim_end());
                if let Some(path) = overlay {
                    let svg = FloorPlanOverlay::new(manager.config().overlay.clone())
                        .render_svg(&fix, locator.table());
                    write_file(&path, &svg)?;
                }
                return Ok(());
            }

            if overlay.is_some() && readings.len() != 1 {
                return Err(CliError::OverlayNeedsSingleRequest(readings.len()));
            }

            let requests = readings
                .iter()
                .map(|path| load_readings(path))
                .collect::<Result<Vec<_>, _>>()?;

            if let [single] = requests.as_slice() {
                let fix = locator.locate(single)?;
                println!("{}", formatter.format_fix(&fix)?.trim_end());
                if let Some(path) = overlay {
                    let svg = FloorPlanOverlay::new(manager.config().overlay.clone())
                        .render_svg(&fix, locator.table());
                    write_file(&path, &svg)?;
                }
                return Ok(());
            }

            let results = locate_batch(&locator, &requests);
            let summary = BatchSummary::from_results(&results);
            info!(succeeded = summary.succeeded, failed = ?summary.failed, "batch complete");
            println!("{}", formatter.format_results(&results)?.trim_end());
            Ok(())
        }

        Command::Overlay { config, x, y, output } => {
            let manager = ConfigurationManager::from_file(&config)?;
            let table = manager.reference_table()?;
            let svg = FloorPlanOverlay::new(manager.config().overlay.clone())
                .render_position(Position::new(x, y), &table);
            write_file(&output, &svg)
        }

        Command::Validate { config } => {
            let content = fs::read_to_string(&config).map_err(|source| CliError::Io {
                path: config.clone(),
                source,
            })?;
            let parsed: PositioningConfig =
                serde_json::from_str(&content).map_err(|e| ConfigError::SerializationError {
                    message: format!("Failed to parse config file '{}': {}", config.display(), e),
                })?;

            let report = ConfigurationManager::new().validate_config(&parsed);
            for warning in &report.warnings {
                warn!("{}", warning);
                println!("warning: {}", warning);
            }
            for error in &report.errors {
                println!("error: {}", error);
            }
            match report.errors.into_iter().next() {
                Some(first) => Err(first.into()),
                None => {
                    println!("{}: ok", config.display());
                    Ok(())
                }
            }
        }
    }
}

fn load_readings(path: &Path) -> Result<Vec<Reading>, CliError> {
    let content = fs::read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_readings(&content).map_err(|source| CliError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

fn write_file(path: &Path, content: &str) -> Result<(), CliError> {
    fs::write(path, content).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "overlay written");
    Ok(())
}
