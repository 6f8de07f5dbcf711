//! # Spinning Twist Calculation
//!
//! Twists per inch (TPI) for a target twist angle, from the yarn's wraps
//! per inch (WPI). Treating the yarn as a cylinder of diameter `1 / WPI`,
//! one full twist advances `π d / tan θ`, so:
//!
//! ```text
//! TPI = tan(θ) × WPI / π
//! ```
//!
//! With the wheel's drive ratio this gives treadles per inch of yarn and
//! how much fiber to draft per treadle.

use serde::{Deserialize, Serialize};

use super::{require_positive, Calculator, ResultLine};
use crate::errors::{FiberError, FiberResult};
use crate::input::{FieldSpec, ToolInput};
use crate::units::{Dimension, UnitSystem};

/// Input parameters for the twist calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinningInput {
    pub wraps_per_inch: f64,
    /// Twist angle in degrees (knitting yarns are typically 10–20°)
    pub twist_angle_deg: f64,
    /// Flyer rotations per treadle
    pub wheel_ratio: f64,
}

impl Default for SpinningInput {
    fn default() -> Self {
        SpinningInput {
            wraps_per_inch: 12.0,
            twist_angle_deg: 15.0,
            wheel_ratio: 8.0,
        }
    }
}

impl ToolInput for SpinningInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::number("wraps_per_inch", "Wraps per inch", Dimension::Density, 1.0, 80.0),
        FieldSpec::number("twist_angle_deg", "Twist angle", Dimension::Angle, 1.0, 60.0),
        FieldSpec::number("wheel_ratio", "Wheel ratio", Dimension::Ratio, 1.0, 40.0),
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "wraps_per_inch" => Some(self.wraps_per_inch),
            "twist_angle_deg" => Some(self.twist_angle_deg),
            "wheel_ratio" => Some(self.wheel_ratio),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "wraps_per_inch" => self.wraps_per_inch = value,
            "twist_angle_deg" => self.twist_angle_deg = value,
            "wheel_ratio" => self.wheel_ratio = value,
            _ => {}
        }
    }
}

/// Results from the twist calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpinningResult {
    pub twists_per_inch: f64,
    pub treadles_per_inch: f64,
    /// Inches of yarn to let onto the bobbin per treadle
    pub draft_per_treadle_in: f64,
}

pub fn calculate(input: &SpinningInput) -> FiberResult<SpinningResult> {
    require_positive("wraps_per_inch", input.wraps_per_inch)?;
    require_positive("wheel_ratio", input.wheel_ratio)?;
    if !(input.twist_angle_deg > 0.0 && input.twist_angle_deg < 90.0) {
        return Err(FiberError::invalid_input(
            "twist_angle_deg",
            input.twist_angle_deg.to_string(),
            "Twist angle must be between 0 and 90 degrees",
        ));
    }

    let twists_per_inch =
        input.twist_angle_deg.to_radians().tan() * input.wraps_per_inch / std::f64::consts::PI;
    let treadles_per_inch = twists_per_inch / input.wheel_ratio;

    Ok(SpinningResult {
        twists_per_inch,
        treadles_per_inch,
        draft_per_treadle_in: input.wheel_ratio / twists_per_inch,
    })
}

/// Spinning twist calculator tool
pub struct SpinningCalculator;

impl Calculator for SpinningCalculator {
    type Input = SpinningInput;
    type Output = SpinningResult;

    const SLUG: &'static str = "spinning-twist-calculator";

    fn calculate(input: &SpinningInput) -> FiberResult<SpinningResult> {
        calculate(input)
    }

    fn present(output: &SpinningResult, units: UnitSystem) -> Vec<ResultLine> {
        vec![
            ResultLine::quantity("Twists", Dimension::Density, output.twists_per_inch, units),
            ResultLine::quantity("Treadles", Dimension::Density, output.treadles_per_inch, units),
            ResultLine::quantity("Draft per treadle", Dimension::Length, output.draft_per_treadle_in, units),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_45_degree_twist() {
        let input = SpinningInput {
            wraps_per_inch: std::f64::consts::PI,
            twist_angle_deg: 45.0,
            wheel_ratio: 2.0,
        };
        let result = calculate(&input).unwrap();
        // tan 45° = 1, so TPI = WPI / π = 1
        assert!((result.twists_per_inch - 1.0).abs() < 1e-9);
        assert!((result.treadles_per_inch - 0.5).abs() < 1e-9);
        assert!((result.draft_per_treadle_in - 2.0).abs() < 1e-9);
    }

    #[test]
    fn test_finer_yarn_needs_more_twist() {
        let worsted = calculate(&SpinningInput::default()).unwrap();
        let fingering = calculate(&SpinningInput {
            wraps_per_inch: 18.0,
            ..SpinningInput::default()
        })
        .unwrap();
        assert!(fingering.twists_per_inch > worsted.twists_per_inch);
    }

    #[test]
    fn test_angle_out_of_range() {
        let input = SpinningInput {
            twist_angle_deg: 90.0,
            ..SpinningInput::default()
        };
        assert!(calculate(&input).is_err());
    }
}
