//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format
//! functions do no I/O.
//!
//! # Output Format
//!
//! ## Apply
//!
//! ```text
//! Source:    photo.jpg (1000x500)
//! Watermark: logo.png (200x100)
//! Placement: top-right
//!     Size: 300x150
//!     Offset: (700, 0)
//!     Opacity: 80%
//! Saved: out/watermarked_image.png (48213 bytes)
//! ```
//!
//! ## Place
//!
//! ```text
//! Placement: center
//!     Size: 240x240
//!     Offset: (280, 280)
//! ```
//!
//! Fractional geometry is shown with up to two decimals; whole numbers are
//! shown without any.

use crate::apply::ApplyOutcome;
use crate::imaging::{CompositePlan, Corner, Dimensions, Placement};
use serde::Serialize;
use std::path::Path;

/// Format a pixel value: integers without decimals, others with two.
fn format_px(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.2}", value)
    }
}

fn input_line(label: &str, name: &str, dims: Dimensions) -> String {
    format!("{:<11}{} ({})", format!("{}:", label), name, dims)
}

fn placement_lines(corner: Corner, placement: &Placement) -> Vec<String> {
    vec![
        format!("Placement: {}", corner),
        format!(
            "    Size: {}x{}",
            format_px(placement.width),
            format_px(placement.height)
        ),
        format!(
            "    Offset: ({}, {})",
            format_px(placement.x),
            format_px(placement.y)
        ),
    ]
}

fn plan_lines(plan: &CompositePlan) -> Vec<String> {
    let mut lines = placement_lines(plan.corner, &plan.placement);
    lines.push(format!(
        "    Opacity: {:.0}%",
        plan.params.opacity.value() * 100.0
    ));
    if plan.params.is_empty() {
        lines.push("    (watermark too small to draw)".to_string());
    }
    lines
}

// ============================================================================
// apply
// ============================================================================

pub fn format_apply_output(outcome: &ApplyOutcome) -> Vec<String> {
    let mut lines = vec![
        input_line("Source", &outcome.source_name, outcome.source_dims),
        input_line("Watermark", &outcome.watermark_name, outcome.watermark_dims),
    ];
    lines.extend(plan_lines(&outcome.plan));
    lines.push(format!(
        "Saved: {} ({} bytes)",
        outcome.output_path.display(),
        outcome.bytes_written
    ));
    lines
}

pub fn print_apply_output(outcome: &ApplyOutcome) {
    for line in format_apply_output(outcome) {
        println!("{}", line);
    }
}

/// Machine-readable form of an apply run, printed with `--json`.
#[derive(Debug, Serialize)]
pub struct ApplyReport<'a> {
    pub source: InputReport<'a>,
    pub watermark: InputReport<'a>,
    pub corner: Corner,
    pub placement: Placement,
    pub opacity: f32,
    pub output: &'a Path,
    pub bytes: usize,
}

#[derive(Debug, Serialize)]
pub struct InputReport<'a> {
    pub name: &'a str,
    #[serde(flatten)]
    pub dimensions: Dimensions,
}

impl<'a> ApplyReport<'a> {
    pub fn from_outcome(outcome: &'a ApplyOutcome) -> Self {
        Self {
            source: InputReport {
                name: &outcome.source_name,
                dimensions: outcome.source_dims,
            },
            watermark: InputReport {
                name: &outcome.watermark_name,
                dimensions: outcome.watermark_dims,
            },
            corner: outcome.plan.corner,
            placement: outcome.plan.placement,
            opacity: outcome.plan.params.opacity.value(),
            output: &outcome.output_path,
            bytes: outcome.bytes_written,
        }
    }
}

// ============================================================================
// check
// ============================================================================

/// Format the dry-run report: inputs plus where the watermark would land.
pub fn format_check_output(
    source: (&str, Dimensions),
    watermark: (&str, Dimensions),
    plan: &CompositePlan,
    output_path: &Path,
) -> Vec<String> {
    let mut lines = vec![
        input_line("Source", source.0, source.1),
        input_line("Watermark", watermark.0, watermark.1),
    ];
    lines.extend(plan_lines(plan));
    lines.push(format!("Would write: {}", output_path.display()));
    lines
}

pub fn print_check_output(
    source: (&str, Dimensions),
    watermark: (&str, Dimensions),
    plan: &CompositePlan,
    output_path: &Path,
) {
    for line in format_check_output(source, watermark, plan, output_path) {
        println!("{}", line);
    }
}

// ============================================================================
// place
// ============================================================================

pub fn format_place_output(corner: Corner, placement: &Placement) -> Vec<String> {
    placement_lines(corner, placement)
}

pub fn print_place_output(corner: Corner, placement: &Placement) {
    for line in format_place_output(corner, placement) {
        println!("{}", line);
    }
}
