//! # Fiber-Arts Calculations
//!
//! Each calculator follows the same pattern:
//!
//! - `*Input` - Input parameters (JSON-serializable, implements [`ToolInput`])
//! - `*Result` - Calculation results (JSON-serializable)
//! - `calculate(&input) -> FiberResult<*Result>` - Pure calculation function
//! - a unit struct implementing [`Calculator`], which ties the two together
//!   for [`crate::session::ToolSession`]
//!
//! ## Available Calculations
//!
//! - [`needles`] - Knitting needle and crochet hook size conversion
//! - [`gauge`] - Pattern gauge vs. your gauge
//! - [`yardage`] - Yarn needed for a rectangular piece
//! - [`cross_stitch`] - Finished design size and fabric cut size
//! - [`weaving`] - Warp and weft requirements from sett
//! - [`spinning`] - Twists per inch from wraps per inch
//! - [`shaping`] - Evenly spaced increases/decreases across a row

pub mod cross_stitch;
pub mod gauge;
pub mod needles;
pub mod shaping;
pub mod spinning;
pub mod weaving;
pub mod yardage;

use std::fmt::Debug;

use serde::{Deserialize, Serialize};

use crate::errors::FiberResult;
use crate::input::ToolInput;
use crate::units::{Dimension, UnitSystem};

// Re-export commonly used types
pub use cross_stitch::{CrossStitchInput, CrossStitchResult};
pub use gauge::{GaugeInput, GaugeResult};
pub use needles::{NeedleConversion, NeedleInput};
pub use shaping::{ShapingInput, ShapingResult};
pub use spinning::{SpinningInput, SpinningResult};
pub use weaving::{WeavingInput, WeavingResult};
pub use yardage::{YardageInput, YardageResult};

/// A pure calculator: validated input in, result out, no hidden state.
pub trait Calculator {
    type Input: ToolInput;
    type Output: Clone + Debug + Serialize;

    /// Slug of the tool this calculator backs
    const SLUG: &'static str;

    fn calculate(input: &Self::Input) -> FiberResult<Self::Output>;

    /// Labelled, unit-projected result lines for display
    fn present(output: &Self::Output, units: UnitSystem) -> Vec<ResultLine>;
}

/// One labelled line of a displayed result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultLine {
    pub label: String,
    pub value: String,
}

impl ResultLine {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        ResultLine {
            label: label.into(),
            value: value.into(),
        }
    }

    /// A line showing a canonical quantity in the display unit system
    pub fn quantity(label: impl Into<String>, dimension: Dimension, canonical: f64, units: UnitSystem) -> Self {
        ResultLine::new(label, dimension.format(canonical, units))
    }
}

/// Reject a non-positive value that would otherwise divide by zero.
pub(crate) fn require_positive(field: &str, value: f64) -> FiberResult<()> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(crate::errors::FiberError::invalid_input(
            field,
            value.to_string(),
            "Must be greater than zero",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_positive() {
        assert!(require_positive("x", 1.0).is_ok());
        assert!(require_positive("x", 0.0).is_err());
        assert!(require_positive("x", -2.0).is_err());
        assert!(require_positive("x", f64::NAN).is_err());
    }

    #[test]
    fn test_quantity_line() {
        let line = ResultLine::quantity("Width", Dimension::Length, 2.0, UnitSystem::Metric);
        assert_eq!(line.label, "Width");
        assert_eq!(line.value, "5.08 cm");
    }
}
