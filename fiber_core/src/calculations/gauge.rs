//! # Gauge Calculation
//!
//! Compares the pattern's gauge with the knitter's own swatch and scales
//! stitch and row counts so the finished piece keeps the pattern's size.
//!
//! Gauge is given as stitches (or rows) over a 4 inch swatch. Patterns
//! printed with a 10 cm swatch use the same numbers by convention, so gauge
//! fields are unit-free counts.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::calculations::gauge::{calculate, GaugeInput};
//!
//! let input = GaugeInput {
//!     pattern_stitches: 20.0,
//!     pattern_rows: 28.0,
//!     your_stitches: 22.0,
//!     your_rows: 28.0,
//!     stitch_count: 100,
//!     row_count: 140,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.adjusted_stitches, 110);
//! assert_eq!(result.adjusted_rows, 140);
//! ```

use serde::{Deserialize, Serialize};

use super::{require_positive, Calculator, ResultLine};
use crate::errors::FiberResult;
use crate::input::{FieldSpec, ToolInput};
use crate::units::{Dimension, UnitSystem};

/// Swatch width gauge is measured over, in inches
pub const SWATCH_IN: f64 = 4.0;

/// Input parameters for the gauge calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeInput {
    /// Pattern stitches per 4 in
    pub pattern_stitches: f64,
    /// Pattern rows per 4 in
    pub pattern_rows: f64,
    /// Your stitches per 4 in
    pub your_stitches: f64,
    /// Your rows per 4 in
    pub your_rows: f64,
    /// Stitch count the pattern asks for
    pub stitch_count: u32,
    /// Row count the pattern asks for
    pub row_count: u32,
}

impl Default for GaugeInput {
    fn default() -> Self {
        GaugeInput {
            pattern_stitches: 20.0,
            pattern_rows: 28.0,
            your_stitches: 20.0,
            your_rows: 28.0,
            stitch_count: 100,
            row_count: 120,
        }
    }
}

impl ToolInput for GaugeInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("pattern_stitches", "Pattern stitches per 4 in", Dimension::Count, 1.0, 100.0),
        FieldSpec::number("pattern_rows", "Pattern rows per 4 in", Dimension::Count, 1.0, 150.0),
        FieldSpec::number("your_stitches", "Your stitches per 4 in", Dimension::Count, 1.0, 100.0),
        FieldSpec::number("your_rows", "Your rows per 4 in", Dimension::Count, 1.0, 150.0),
        FieldSpec::count("stitch_count", "Pattern stitch count", 1.0, 10_000.0),
        FieldSpec::count("row_count", "Pattern row count", 1.0, 10_000.0),
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "pattern_stitches" => Some(self.pattern_stitches),
            "pattern_rows" => Some(self.pattern_rows),
            "your_stitches" => Some(self.your_stitches),
            "your_rows" => Some(self.your_rows),
            "stitch_count" => Some(self.stitch_count as f64),
            "row_count" => Some(self.row_count as f64),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "pattern_stitches" => self.pattern_stitches = value,
            "pattern_rows" => self.pattern_rows = value,
            "your_stitches" => self.your_stitches = value,
            "your_rows" => self.your_rows = value,
            "stitch_count" => self.stitch_count = value as u32,
            "row_count" => self.row_count = value as u32,
            _ => {}
        }
    }
}

/// Results from the gauge calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaugeResult {
    /// your_stitches / pattern_stitches
    pub stitch_ratio: f64,
    /// your_rows / pattern_rows
    pub row_ratio: f64,
    /// Stitches to cast on at your gauge for the pattern's width
    pub adjusted_stitches: u32,
    /// Rows to work at your gauge for the pattern's length
    pub adjusted_rows: u32,
    /// Width the pattern intends (in)
    pub pattern_width_in: f64,
    /// Width you get working the pattern's stitch count unchanged (in)
    pub your_width_in: f64,
    pub pattern_length_in: f64,
    pub your_length_in: f64,
    /// How much wider (+) or narrower (−) the unadjusted piece comes out
    pub width_difference_percent: f64,
}

/// Compare gauges and scale counts.
pub fn calculate(input: &GaugeInput) -> FiberResult<GaugeResult> {
    require_positive("pattern_stitches", input.pattern_stitches)?;
    require_positive("pattern_rows", input.pattern_rows)?;
    require_positive("your_stitches", input.your_stitches)?;
    require_positive("your_rows", input.your_rows)?;

    let stitch_ratio = input.your_stitches / input.pattern_stitches;
    let row_ratio = input.your_rows / input.pattern_rows;

    let stitches = input.stitch_count as f64;
    let rows = input.row_count as f64;

    let pattern_width_in = stitches * SWATCH_IN / input.pattern_stitches;
    let your_width_in = stitches * SWATCH_IN / input.your_stitches;
    let pattern_length_in = rows * SWATCH_IN / input.pattern_rows;
    let your_length_in = rows * SWATCH_IN / input.your_rows;

    Ok(GaugeResult {
        stitch_ratio,
        row_ratio,
        adjusted_stitches: (stitches * stitch_ratio).round() as u32,
        adjusted_rows: (rows * row_ratio).round() as u32,
        pattern_width_in,
        your_width_in,
        pattern_length_in,
        your_length_in,
        width_difference_percent: (your_width_in - pattern_width_in) / pattern_width_in * 100.0,
    })
}

/// Gauge calculator tool
pub struct GaugeCalculator;

impl Calculator for GaugeCalculator {
    type Input = GaugeInput;
    type Output = GaugeResult;

    const SLUG: &'static str = "gauge-calculator";

    fn calculate(input: &GaugeInput) -> FiberResult<GaugeResult> {
        calculate(input)
    }

    fn present(output: &GaugeResult, units: UnitSystem) -> Vec<ResultLine> {
        vec![
            ResultLine::new("Adjusted stitches", output.adjusted_stitches.to_string()),
            ResultLine::new("Adjusted rows", output.adjusted_rows.to_string()),
            ResultLine::quantity("Pattern width", Dimension::Length, output.pattern_width_in, units),
            ResultLine::quantity("Width at your gauge", Dimension::Length, output.your_width_in, units),
            ResultLine::quantity("Pattern length", Dimension::Length, output.pattern_length_in, units),
            ResultLine::quantity("Length at your gauge", Dimension::Length, output.your_length_in, units),
            ResultLine::quantity("Width difference", Dimension::Percent, output.width_difference_percent, units),
        ]
    }
}
