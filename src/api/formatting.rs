//! Position output formatting
//!
//! Renders fixes as a human-readable report, JSON, or CSV rows.

use crate::api::types::{OutputFormat, PositionFix};
use crate::validation::error::PositioningResult;
use std::fmt::Write;

/// Formats fixes and batch results in one output format
#[derive(Debug, Clone)]
pub struct PositionFormatter {
    format: OutputFormat,
    /// Decimal places for coordinates and distances in text and CSV
    precision: usize,
}

impl PositionFormatter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format, precision: 3 }
    }

    pub fn with_precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Format a single fix
    pub fn format_fix(&self, fix: &PositionFix) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Text => Ok(self.text(fix)),
            OutputFormat::Json => serde_json::to_string_pretty(fix),
            OutputFormat::Csv => Ok(format!("{}\n{}", csv_header(), self.csv_row(0, fix))),
        }
    }

    /// Format a batch, keeping failed requests visible in the output
    pub fn format_results(&self, results: &[PositioningResult<PositionFix>]) -> serde_json::Result<String> {
        match self.format {
            OutputFormat::Text => {
                let mut out = String::new();
                for (index, result) in results.iter().enumerate() {
                    let _ = writeln!(out, "# request {}", index);
                    match result {
                        Ok(fix) => out.push_str(&self.text(fix)),
                        Err(e) => {
                            let _ = writeln!(out, "error: {}", e);
                        }
                    }
                }
                Ok(out)
            }
            OutputFormat::Json => {
                let entries: Vec<serde_json::Value> = results
                    .iter()
                    .map(|result| match result {
                        Ok(fix) => serde_json::to_value(fix),
                        Err(e) => Ok(serde_json::json!({
                            "error": { "kind": e.kind_name(), "message": e.to_string() }
                        })),
                    })
                    .collect::<serde_json::Result<_>>()?;
                serde_json::to_string_pretty(&entries)
            }
            OutputFormat::Csv => {
                let mut out = String::from(csv_header());
                for (index, result) in results.iter().enumerate() {
                    out.push('\n');
                    match result {
                        Ok(fix) => out.push_str(&self.csv_row(index, fix)),
                        Err(e) => {
                            let _ = write!(out, "{},{},,,,,,", index, e.kind_name());
                        }
                    }
                }
                Ok(out)
            }
        }
    }

    fn text(&self, fix: &PositionFix) -> String {
        let p = self.precision;
        let mut out = String::new();

        let _ = writeln!(out, "x: {:.p$}", fix.position.x);
        let _ = writeln!(out, "y: {:.p$}", fix.position.y);
        let _ = writeln!(out, "pivot: {}", fix.pivot);
        match fix.hdop {
            Some(hdop) => {
                let _ = writeln!(out, "geometry: {:?} (hdop {:.2})", fix.geometry_quality, hdop);
            }
            None => {
                let _ = writeln!(out, "geometry: {:?}", fix.geometry_quality);
            }
        }
        let _ = writeln!(out, "anchors:");
        for (anchor, residual) in fix.anchors.iter().zip(fix.residuals) {
            let _ = writeln!(
                out,
                "  {} at ({:.p$}, {:.p$}): rssi {:.1} dBm, distance {:.p$} m, residual {:.p$} m",
                anchor.id, anchor.position.x, anchor.position.y, anchor.rssi, anchor.distance, residual
            );
        }
        out
    }

    fn csv_row(&self, index: usize, fix: &PositionFix) -> String {
        let p = self.precision;
        let hdop = fix.hdop.map(|h| format!("{:.3}", h)).unwrap_or_default();
        format!(
            "{},ok,{:.p$},{:.p$},{},{},{:.p$},{}",
            index,
            fix.position.x,
            fix.position.y,
            fix.pivot,
            hdop,
            fix.max_residual(),
            fix.anchor_ids().join(";")
        )
    }
}

impl Default for PositionFormatter {
    fn default() -> Self {
        Self::new(OutputFormat::default())
    }
}

pub fn csv_header() -> &'static str {
    "request,status,x,y,pivot,hdop,max_residual,anchors"
}
