//! # Cross-Stitch Fabric Calculation
//!
//! Finished design size and fabric cut size for a chart of W × H stitches.
//!
//! Stitching "over two" on evenweave/linen covers two fabric threads per
//! stitch, halving the effective count (28 ct over two = 14 stitches/in).

use serde::{Deserialize, Serialize};

use super::{Calculator, ResultLine};
use crate::errors::{FiberError, FiberResult};
use crate::input::{ChoiceSpec, FieldSpec, ToolInput};
use crate::units::{Dimension, UnitSystem};

/// Fabric thread counts offered by the calculator
pub const FABRIC_COUNTS: [u32; 9] = [11, 14, 16, 18, 22, 25, 28, 32, 36];

const FABRIC_COUNT_OPTIONS: &[&str] = &["11", "14", "16", "18", "22", "25", "28", "32", "36"];

/// Input parameters for the cross-stitch calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossStitchInput {
    pub design_width_stitches: u32,
    pub design_height_stitches: u32,
    /// Fabric threads (or Aida squares) per inch
    pub fabric_count: u32,
    /// Each stitch covers two fabric threads
    pub over_two: bool,
    /// Unstitched border on every side (in)
    pub margin_in: f64,
}

impl Default for CrossStitchInput {
    fn default() -> Self {
        CrossStitchInput {
            design_width_stitches: 140,
            design_height_stitches: 98,
            fabric_count: 14,
            over_two: false,
            margin_in: 3.0,
        }
    }
}

impl ToolInput for CrossStitchInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::count("design_width_stitches", "Design width (stitches)", 1.0, 2_000.0),
        FieldSpec::count("design_height_stitches", "Design height (stitches)", 1.0, 2_000.0),
        FieldSpec::number("margin_in", "Margin per side", Dimension::Length, 0.0, 12.0),
    ];
    const CHOICES: &'static [ChoiceSpec] = &[
        ChoiceSpec {
            name: "fabric_count",
            label: "Fabric count",
            options: FABRIC_COUNT_OPTIONS,
        },
        ChoiceSpec {
            name: "over_two",
            label: "Stitch over two threads",
            options: &["yes", "no"],
        },
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "design_width_stitches" => Some(self.design_width_stitches as f64),
            "design_height_stitches" => Some(self.design_height_stitches as f64),
            "margin_in" => Some(self.margin_in),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "design_width_stitches" => self.design_width_stitches = value as u32,
            "design_height_stitches" => self.design_height_stitches = value as u32,
            "margin_in" => self.margin_in = value,
            _ => {}
        }
    }

    fn choice(&self, field: &str) -> Option<String> {
        match field {
            "fabric_count" => Some(self.fabric_count.to_string()),
            "over_two" => Some(if self.over_two { "yes" } else { "no" }.to_string()),
            _ => None,
        }
    }

    fn put_choice(&mut self, field: &str, option: &str) -> bool {
        match field {
            "fabric_count" => match option.parse::<u32>() {
                Ok(count) if FABRIC_COUNTS.contains(&count) => {
                    self.fabric_count = count;
                    true
                }
                _ => false,
            },
            "over_two" => match option {
                "yes" => {
                    self.over_two = true;
                    true
                }
                "no" => {
                    self.over_two = false;
                    true
                }
                _ => false,
            },
            _ => false,
        }
    }
}

/// Results from the cross-stitch calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossStitchResult {
    /// Stitches per inch actually worked
    pub stitches_per_inch: f64,
    pub design_width_in: f64,
    pub design_height_in: f64,
    /// Fabric to cut, design plus margin on both sides
    pub fabric_width_in: f64,
    pub fabric_height_in: f64,
}

pub fn calculate(input: &CrossStitchInput) -> FiberResult<CrossStitchResult> {
    if input.fabric_count == 0 {
        return Err(FiberError::invalid_input(
            "fabric_count",
            "0",
            "Fabric count must be positive",
        ));
    }
    if input.margin_in < 0.0 {
        return Err(FiberError::invalid_input(
            "margin_in",
            input.margin_in.to_string(),
            "Margin cannot be negative",
        ));
    }

    let threads_per_stitch = if input.over_two { 2.0 } else { 1.0 };
    let stitches_per_inch = input.fabric_count as f64 / threads_per_stitch;

    let design_width_in = input.design_width_stitches as f64 / stitches_per_inch;
    let design_height_in = input.design_height_stitches as f64 / stitches_per_inch;

    Ok(CrossStitchResult {
        stitches_per_inch,
        design_width_in,
        design_height_in,
        fabric_width_in: design_width_in + 2.0 * input.margin_in,
        fabric_height_in: design_height_in + 2.0 * input.margin_in,
    })
}

/// Cross-stitch fabric calculator tool
pub struct CrossStitchCalculator;

impl Calculator for CrossStitchCalculator {
    type Input = CrossStitchInput;
    type Output = CrossStitchResult;

    const SLUG: &'static str = "cross-stitch-calculator";

    fn calculate(input: &CrossStitchInput) -> FiberResult<CrossStitchResult> {
        calculate(input)
    }

    fn present(output: &CrossStitchResult, units: UnitSystem) -> Vec<ResultLine> {
        let size = |w: f64, h: f64| {
            format!(
                "{} × {}",
                Dimension::Length.format(w, units),
                Dimension::Length.format(h, units)
            )
        };
        vec![
            ResultLine::new("Stitches per inch", format!("{:.1}", output.stitches_per_inch)),
            ResultLine::new("Design size", size(output.design_width_in, output.design_height_in)),
            ResultLine::new("Cut fabric", size(output.fabric_width_in, output.fabric_height_in)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::set_choice;

    #[test]
    fn test_14_count_aida() {
        let result = calculate(&CrossStitchInput::default()).unwrap();
        assert_eq!(result.design_width_in, 10.0);
        assert_eq!(result.design_height_in, 7.0);
        assert_eq!(result.fabric_width_in, 16.0);
        assert_eq!(result.fabric_height_in, 13.0);
    }

    #[test]
    fn test_over_two_matches_half_count() {
        let evenweave = CrossStitchInput {
            fabric_count: 28,
            over_two: true,
            ..CrossStitchInput::default()
        };
        let aida = calculate(&CrossStitchInput::default()).unwrap();
        let result = calculate(&evenweave).unwrap();
        assert_eq!(result.stitches_per_inch, 14.0);
        assert_eq!(result.design_width_in, aida.design_width_in);
    }

    #[test]
    fn test_fabric_count_choice() {
        let mut input = CrossStitchInput::default();
        assert!(set_choice(&mut input, "fabric_count", "18").changed());
        assert_eq!(input.fabric_count, 18);
        assert!(!set_choice(&mut input, "fabric_count", "15").changed());
        assert_eq!(input.fabric_count, 18);
    }

    #[test]
    fn test_over_two_only_yes_or_no() {
        let mut input = CrossStitchInput::default();
        assert!(input.put_choice("over_two", "yes"));
        assert!(input.over_two);
        assert!(!input.put_choice("over_two", "maybe"));
        assert!(input.over_two);
        assert!(input.put_choice("over_two", "no"));
        assert!(!input.over_two);
    }

    #[test]
    fn test_zero_count_rejected() {
        let input = CrossStitchInput {
            fabric_count: 0,
            ..CrossStitchInput::default()
        };
        assert!(calculate(&input).is_err());
    }
}
