//! Floor-plan overlay rendering
//!
//! Positions are scaled from meters to pixels and drawn as filled circles.
//! A marker occupies the square whose top-left corner is the scaled point,
//! so the circle sits below and to the right of the coordinate it marks.

use crate::api::types::PositionFix;
use crate::core::Position;
use crate::utils::config::OverlayConfig;
use crate::utils::reference_table::ReferenceTable;
use std::fmt::Write;

/// Pixel-space bounding box of a circular marker
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerBox {
    pub left: f64,
    pub top: f64,
    pub right: f64,
    pub bottom: f64,
}

impl MarkerBox {
    pub fn center(&self) -> (f64, f64) {
        ((self.left + self.right) / 2.0, (self.top + self.bottom) / 2.0)
    }

    pub fn radius(&self) -> f64 {
        (self.right - self.left) / 2.0
    }
}

/// SVG renderer for reference points and position estimates
#[derive(Debug, Clone, Default)]
pub struct FloorPlanOverlay {
    config: OverlayConfig,
}

impl FloorPlanOverlay {
    pub fn new(config: OverlayConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    /// Marker box for `position` with a marker `size` pixels across
    pub fn marker_box(&self, position: Position, size: f64) -> MarkerBox {
        let left = position.x * self.config.pixels_per_meter;
        let top = position.y * self.config.pixels_per_meter;
        MarkerBox {
            left,
            top,
            right: left + size,
            bottom: top + size,
        }
    }

    /// Render every reference point and the fix's estimate
    pub fn render_svg(&self, fix: &PositionFix, table: &ReferenceTable) -> String {
        self.render_position(fix.position, table)
    }

    /// Render every reference point and a device marker at `device`
    pub fn render_position(&self, device: Position, table: &ReferenceTable) -> String {
        let reference_markers: Vec<(String, MarkerBox)> = table
            .points()
            .into_iter()
            .map(|point| {
                (
                    point.id.clone(),
                    self.marker_box(point.position, self.config.reference_marker_px),
                )
            })
            .collect();
        let device_marker = self.marker_box(device, self.config.device_marker_px);

        let (width, height) = match self.config.canvas_px {
            Some((width, height)) => (f64::from(width), f64::from(height)),
            None => reference_markers
                .iter()
                .map(|(_, marker)| marker)
                .chain(std::iter::once(&device_marker))
                .fold((0.0_f64, 0.0_f64), |(w, h), marker| {
                    (w.max(marker.right), h.max(marker.bottom))
                }),
        };

        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            w = width.ceil(),
            h = height.ceil()
        );
        if let Some(image) = &self.config.floor_plan_image {
            let _ = writeln!(
                svg,
                r#"  <image href="{}" x="0" y="0" width="{}" height="{}"/>"#,
                escape_xml(image),
                width.ceil(),
                height.ceil()
            );
        }
        for (id, marker) in &reference_markers {
            push_circle(&mut svg, marker, self.config.reference_color, "reference", id);
        }
        push_circle(
            &mut svg,
            &device_marker,
            self.config.device_color,
            "device",
            &device.to_string(),
        );
        svg.push_str("</svg>\n");
        svg
    }
}

fn push_circle(svg: &mut String, marker: &MarkerBox, color: [u8; 3], class: &str, title: &str) {
    let (cx, cy) = marker.center();
    let [r, g, b] = color;
    let _ = writeln!(
        svg,
        r#"  <circle class="{}" cx="{}" cy="{}" r="{}" fill="rgb({},{},{})"><title>{}</title></circle>"#,
        class,
        cx,
        cy,
        marker.radius(),
        r,
        g,
        b,
        escape_xml(title)
    );
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            c => escaped.push(c),
        }
    }
    escaped
}
