//! # Yarn Yardage Estimate
//!
//! Estimates the yarn a rectangular piece needs:
//!
//! ```text
//! stitches = area × stitches-per-square-inch
//! yards    = stitches × yards-per-stitch × (1 + waste%)
//! skeins   = ceil(yards / yards-per-skein)
//! ```

use serde::{Deserialize, Serialize};

use super::{require_positive, Calculator, ResultLine};
use crate::errors::FiberResult;
use crate::input::{FieldSpec, ToolInput};
use crate::units::{Dimension, Meters, UnitSystem, Yards};

use super::gauge::SWATCH_IN;

/// Input parameters for the yardage estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YardageInput {
    pub width_in: f64,
    pub length_in: f64,
    /// Stitches per 4 in
    pub stitches_per_4in: f64,
    /// Rows per 4 in
    pub rows_per_4in: f64,
    /// Yarn consumed by a single stitch (yd)
    pub yards_per_stitch: f64,
    /// Allowance for swatching, seaming and weaving in ends
    pub waste_percent: f64,
    /// Yardage of one skein/ball
    pub skein_yards: f64,
}

impl Default for YardageInput {
    fn default() -> Self {
        YardageInput {
            width_in: 8.0,
            length_in: 60.0,
            stitches_per_4in: 20.0,
            rows_per_4in: 28.0,
            yards_per_stitch: 0.03,
            waste_percent: 10.0,
            skein_yards: 220.0,
        }
    }
}

impl ToolInput for YardageInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("width_in", "Width", Dimension::Length, 0.5, 200.0),
        FieldSpec::number("length_in", "Length", Dimension::Length, 0.5, 400.0),
        FieldSpec::number("stitches_per_4in", "Stitches per 4 in", Dimension::Count, 1.0, 100.0),
        FieldSpec::number("rows_per_4in", "Rows per 4 in", Dimension::Count, 1.0, 150.0),
        FieldSpec::number("yards_per_stitch", "Yarn per stitch", Dimension::Yardage, 0.001, 1.0),
        FieldSpec::number("waste_percent", "Waste allowance", Dimension::Percent, 0.0, 100.0),
        FieldSpec::number("skein_yards", "Yarn per skein", Dimension::Yardage, 1.0, 5_000.0),
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "width_in" => Some(self.width_in),
            "length_in" => Some(self.length_in),
            "stitches_per_4in" => Some(self.stitches_per_4in),
            "rows_per_4in" => Some(self.rows_per_4in),
            "yards_per_stitch" => Some(self.yards_per_stitch),
            "waste_percent" => Some(self.waste_percent),
            "skein_yards" => Some(self.skein_yards),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "width_in" => self.width_in = value,
            "length_in" => self.length_in = value,
            "stitches_per_4in" => self.stitches_per_4in = value,
            "rows_per_4in" => self.rows_per_4in = value,
            "yards_per_stitch" => self.yards_per_stitch = value,
            "waste_percent" => self.waste_percent = value,
            "skein_yards" => self.skein_yards = value,
            _ => {}
        }
    }
}

/// Results from the yardage estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YardageResult {
    pub area_sq_in: f64,
    pub total_stitches: f64,
    /// Yarn before waste allowance
    pub base_yards: f64,
    /// Yarn including waste allowance
    pub total_yards: f64,
    pub total_meters: f64,
    pub skeins: u32,
}

pub fn calculate(input: &YardageInput) -> FiberResult<YardageResult> {
    require_positive("width_in", input.width_in)?;
    require_positive("length_in", input.length_in)?;
    require_positive("stitches_per_4in", input.stitches_per_4in)?;
    require_positive("rows_per_4in", input.rows_per_4in)?;
    require_positive("yards_per_stitch", input.yards_per_stitch)?;
    require_positive("skein_yards", input.skein_yards)?;

    let area_sq_in = input.width_in * input.length_in;
    let stitches_per_sq_in = (input.stitches_per_4in / SWATCH_IN) * (input.rows_per_4in / SWATCH_IN);
    let total_stitches = area_sq_in * stitches_per_sq_in;
    let base_yards = total_stitches * input.yards_per_stitch;
    let total_yards = base_yards * (1.0 + input.waste_percent.max(0.0) / 100.0);
    let meters: Meters = Yards(total_yards).into();

    Ok(YardageResult {
        area_sq_in,
        total_stitches,
        base_yards,
        total_yards,
        total_meters: meters.value(),
        skeins: (total_yards / input.skein_yards).ceil() as u32,
    })
}

/// Yarn yardage estimator tool
pub struct YardageCalculator;

impl Calculator for YardageCalculator {
    type Input = YardageInput;
    type Output = YardageResult;

    const SLUG: &'static str = "yarn-yardage-calculator";

    fn calculate(input: &YardageInput) -> FiberResult<YardageResult> {
        calculate(input)
    }

    fn present(output: &YardageResult, units: UnitSystem) -> Vec<ResultLine> {
        vec![
            ResultLine::new("Stitches", format!("{:.0}", output.total_stitches)),
            ResultLine::quantity("Yarn (no waste)", Dimension::Yardage, output.base_yards, units),
            ResultLine::quantity("Yarn needed", Dimension::Yardage, output.total_yards, units),
            ResultLine::new("Skeins", output.skeins.to_string()),
        ]
    }
}
