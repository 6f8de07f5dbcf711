//! # Weaving Warp Calculation
//!
//! Warp and weft requirements for a project on the loom.
//!
//! ```text
//! ends         = ceil(width × sett) + floating selvedges
//! woven length = finished length × (1 + take-up% + shrinkage%)
//! warp length  = woven length + loom waste
//! warp yards   = ends × warp length / 36
//! weft yards   = PPI × woven length × width × (1 + take-up%) / 36
//! ```

use serde::{Deserialize, Serialize};

use super::{require_positive, Calculator, ResultLine};
use crate::errors::FiberResult;
use crate::input::{FieldSpec, ToolInput};
use crate::units::{Dimension, Inches, UnitSystem, Yards};

/// Input parameters for the warp calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeavingInput {
    /// Width in the reed (in)
    pub width_in: f64,
    /// Ends per inch
    pub sett_epi: f64,
    /// Picks per inch
    pub ppi: f64,
    /// Finished length wanted (in)
    pub finished_length_in: f64,
    pub take_up_percent: f64,
    pub shrinkage_percent: f64,
    /// Front and back loom waste combined (in)
    pub loom_waste_in: f64,
    pub floating_selvedges: u32,
}

impl Default for WeavingInput {
    fn default() -> Self {
        WeavingInput {
            width_in: 10.0,
            sett_epi: 12.0,
            ppi: 12.0,
            finished_length_in: 72.0,
            take_up_percent: 10.0,
            shrinkage_percent: 10.0,
            loom_waste_in: 24.0,
            floating_selvedges: 2,
        }
    }
}

impl ToolInput for WeavingInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("width_in", "Width in reed", Dimension::Length, 0.5, 120.0),
        FieldSpec::number("sett_epi", "Sett (ends per inch)", Dimension::Density, 1.0, 120.0),
        FieldSpec::number("ppi", "Picks per inch", Dimension::Density, 1.0, 120.0),
        FieldSpec::number("finished_length_in", "Finished length", Dimension::Length, 1.0, 1_200.0),
        FieldSpec::number("take_up_percent", "Take-up", Dimension::Percent, 0.0, 50.0),
        FieldSpec::number("shrinkage_percent", "Shrinkage", Dimension::Percent, 0.0, 50.0),
        FieldSpec::number("loom_waste_in", "Loom waste", Dimension::Length, 0.0, 120.0),
        FieldSpec::count("floating_selvedges", "Floating selvedges", 0.0, 4.0),
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "width_in" => Some(self.width_in),
            "sett_epi" => Some(self.sett_epi),
            "ppi" => Some(self.ppi),
            "finished_length_in" => Some(self.finished_length_in),
            "take_up_percent" => Some(self.take_up_percent),
            "shrinkage_percent" => Some(self.shrinkage_percent),
            "loom_waste_in" => Some(self.loom_waste_in),
            "floating_selvedges" => Some(self.floating_selvedges as f64),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "width_in" => self.width_in = value,
            "sett_epi" => self.sett_epi = value,
            "ppi" => self.ppi = value,
            "finished_length_in" => self.finished_length_in = value,
            "take_up_percent" => self.take_up_percent = value,
            "shrinkage_percent" => self.shrinkage_percent = value,
            "loom_waste_in" => self.loom_waste_in = value,
            "floating_selvedges" => self.floating_selvedges = value as u32,
            _ => {}
        }
    }
}

/// Results from the warp calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeavingResult {
    pub ends: u32,
    /// Length woven on the loom before take-up and shrinkage (in)
    pub woven_length_in: f64,
    /// Length of each warp end including loom waste (in)
    pub warp_length_in: f64,
    pub warp_yards: f64,
    pub weft_yards: f64,
    pub total_yards: f64,
}

pub fn calculate(input: &WeavingInput) -> FiberResult<WeavingResult> {
    require_positive("width_in", input.width_in)?;
    require_positive("sett_epi", input.sett_epi)?;
    require_positive("ppi", input.ppi)?;
    require_positive("finished_length_in", input.finished_length_in)?;

    let take_up = input.take_up_percent.max(0.0) / 100.0;
    let shrinkage = input.shrinkage_percent.max(0.0) / 100.0;

    let ends = ((input.width_in * input.sett_epi).ceil() as u32).saturating_add(input.floating_selvedges);
    let woven_length_in = input.finished_length_in * (1.0 + take_up + shrinkage);
    let warp_length_in = woven_length_in + input.loom_waste_in.max(0.0);

    let warp: Yards = Inches(ends as f64 * warp_length_in).into();
    let weft: Yards = Inches(input.ppi * woven_length_in * input.width_in * (1.0 + take_up)).into();

    Ok(WeavingResult {
        ends,
        woven_length_in,
        warp_length_in,
        warp_yards: warp.value(),
        weft_yards: weft.value(),
        total_yards: (warp + weft).value(),
    })
}

/// Weaving warp calculator tool
pub struct WeavingCalculator;

impl Calculator for WeavingCalculator {
    type Input = WeavingInput;
    type Output = WeavingResult;

    const SLUG: &'static str = "weaving-warp-calculator";

    fn calculate(input: &WeavingInput) -> FiberResult<WeavingResult> {
        calculate(input)
    }

    fn present(output: &WeavingResult, units: UnitSystem) -> Vec<ResultLine> {
        vec![
            ResultLine::new("Warp ends", output.ends.to_string()),
            ResultLine::quantity("Warp length per end", Dimension::Length, output.warp_length_in, units),
            ResultLine::quantity("Warp yarn", Dimension::Yardage, output.warp_yards, units),
            ResultLine::quantity("Weft yarn", Dimension::Yardage, output.weft_yards, units),
            ResultLine::quantity("Total yarn", Dimension::Yardage, output.total_yards, units),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_scarf_warp() {
        let result = calculate(&WeavingInput::default()).unwrap();
        // 10 in × 12 epi = 120 ends + 2 selvedges
        assert_eq!(result.ends, 122);
        // 72 × 1.2 = 86.4 in woven, + 24 in waste = 110.4 in
        assert!((result.woven_length_in - 86.4).abs() < 1e-9);
        assert!((result.warp_length_in - 110.4).abs() < 1e-9);
        // 122 × 110.4 / 36 = 374.13 yd
        assert!((result.warp_yards - 374.133).abs() < 0.001);
        // 12 × 86.4 × 10 × 1.1 / 36 = 316.8 yd
        assert!((result.weft_yards - 316.8).abs() < 1e-6);
        assert!((result.total_yards - (result.warp_yards + result.weft_yards)).abs() < 1e-9);
    }

    #[test]
    fn test_fractional_ends_round_up() {
        let input = WeavingInput {
            width_in: 10.25,
            floating_selvedges: 0,
            ..WeavingInput::default()
        };
        // 10.25 × 12 = 123
        assert_eq!(calculate(&input).unwrap().ends, 123);

        let input = WeavingInput {
            width_in: 10.3,
            floating_selvedges: 0,
            ..WeavingInput::default()
        };
        // 10.3 × 12 = 123.6 → 124
        assert_eq!(calculate(&input).unwrap().ends, 124);
    }

    #[test]
    fn test_huge_selvedge_count_saturates() {
        let input = WeavingInput {
            floating_selvedges: u32::MAX,
            ..WeavingInput::default()
        };
        assert_eq!(calculate(&input).unwrap().ends, u32::MAX);
    }

    #[test]
    fn test_zero_sett_rejected() {
        let input = WeavingInput {
            sett_epi: 0.0,
            ..WeavingInput::default()
        };
        assert!(calculate(&input).is_err());
    }
}
