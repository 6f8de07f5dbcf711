//! # Increase / Decrease Evenly
//!
//! Spreads `n` increases or decreases as evenly as possible across a row
//! of `s` stitches and writes the result as repeat groups.
//!
//! Increases sit in the `n` gaps between `n + 1` runs of plain stitches, so
//! the row never starts or ends on an increase. Decreases (k2tog) consume
//! two stitches each; the `s - 2n` plain stitches are spread over `n + 1`
//! runs the same way.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::calculations::shaping::{calculate, ShapingInput};
//!
//! let result = calculate(&ShapingInput { current_stitches: 20, change: 4 }).unwrap();
//! assert_eq!(result.final_stitches, 24);
//! assert_eq!(result.instructions, "(k4, M1) × 4, k4");
//! ```

use serde::{Deserialize, Serialize};

use super::{Calculator, ResultLine};
use crate::errors::{FiberError, FiberResult};
use crate::input::{FieldSpec, ToolInput};
use crate::units::{Dimension, UnitSystem};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapingAction {
    Increase,
    Decrease,
    /// Plain stitches only (end of row)
    None,
}

/// `repeat` times: work `work` plain stitches, then `action`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapingStep {
    pub repeat: u32,
    pub work: u32,
    pub action: ShapingAction,
}

impl ShapingStep {
    fn describe(&self) -> String {
        let action = match self.action {
            ShapingAction::Increase => "M1",
            ShapingAction::Decrease => "k2tog",
            ShapingAction::None => return format!("k{}", self.work),
        };
        let body = if self.work == 0 {
            action.to_string()
        } else {
            format!("k{}, {}", self.work, action)
        };
        format!("({}) × {}", body, self.repeat)
    }

    /// Stitches this step consumes from the needle
    fn consumed(&self) -> u32 {
        let per_repeat = match self.action {
            ShapingAction::Decrease => self.work + 2,
            ShapingAction::Increase | ShapingAction::None => self.work,
        };
        per_repeat * self.repeat
    }
}

/// Input parameters for increase/decrease evenly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapingInput {
    pub current_stitches: u32,
    /// Positive to increase, negative to decrease
    pub change: i32,
}

impl Default for ShapingInput {
    fn default() -> Self {
        ShapingInput {
            current_stitches: 80,
            change: 8,
        }
    }
}

impl ToolInput for ShapingInput {
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::count("current_stitches", "Stitches on needle", 1.0, 2_000.0),
        FieldSpec::count("change", "Stitches to add (+) or remove (−)", -1_000.0, 1_000.0),
    ];

    fn get(&self, field: &str) -> Option<f64> {
        match field {
            "current_stitches" => Some(self.current_stitches as f64),
            "change" => Some(self.change as f64),
            _ => None,
        }
    }

    fn put(&mut self, field: &str, value: f64) {
        match field {
            "current_stitches" => self.current_stitches = value as u32,
            "change" => self.change = value as i32,
            _ => {}
        }
    }
}

/// Results from increase/decrease evenly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapingResult {
    pub final_stitches: u32,
    pub steps: Vec<ShapingStep>,
    pub instructions: String,
}

/// Split `plain` stitches into `runs` runs and emit steps, with `action`
/// after every run except the last.
fn distribute(plain: u32, runs: u32, action: ShapingAction) -> Vec<ShapingStep> {
    let base = plain / runs;
    let longer = plain % runs;
    let shaped = runs - 1;

    // Longer runs go first; the tail run is always a base-length run
    // because longer < runs.
    let mut steps = Vec::with_capacity(3);
    if longer > 0 {
        steps.push(ShapingStep {
            repeat: longer,
            work: base + 1,
            action,
        });
    }
    if shaped > longer {
        steps.push(ShapingStep {
            repeat: shaped - longer,
            work: base,
            action,
        });
    }
    if base > 0 {
        steps.push(ShapingStep {
            repeat: 1,
            work: base,
            action: ShapingAction::None,
        });
    }
    steps
}

pub fn calculate(input: &ShapingInput) -> FiberResult<ShapingResult> {
    let stitches = input.current_stitches;
    if stitches == 0 {
        return Err(FiberError::invalid_input(
            "current_stitches",
            "0",
            "Need at least one stitch on the needle",
        ));
    }

    let amount = input.change.unsigned_abs();
    let steps = if input.change == 0 {
        vec![ShapingStep {
            repeat: 1,
            work: stitches,
            action: ShapingAction::None,
        }]
    } else if input.change > 0 {
        if amount > stitches {
            return Err(FiberError::invalid_input(
                "change",
                input.change.to_string(),
                format!("Cannot work more than {} increases across {} stitches", stitches, stitches),
            ));
        }
        distribute(stitches, amount + 1, ShapingAction::Increase)
    } else {
        if amount > stitches / 2 {
            return Err(FiberError::invalid_input(
                "change",
                input.change.to_string(),
                format!("Each decrease needs two stitches; at most {} fit", stitches / 2),
            ));
        }
        distribute(stitches - 2 * amount, amount + 1, ShapingAction::Decrease)
    };

    let final_stitches = if input.change >= 0 {
        stitches.checked_add(amount).ok_or_else(|| {
            FiberError::invalid_input(
                "current_stitches",
                stitches.to_string(),
                "Too many stitches to count after increasing",
            )
        })?
    } else {
        stitches - amount
    };
    let instructions = steps
        .iter()
        .map(ShapingStep::describe)
        .collect::<Vec<_>>()
        .join(", ");

    debug_assert_eq!(steps.iter().map(ShapingStep::consumed).sum::<u32>(), stitches);

    Ok(ShapingResult {
        final_stitches,
        steps,
        instructions,
    })
}

/// Increase/decrease evenly tool
pub struct ShapingCalculator;

impl Calculator for ShapingCalculator {
    type Input = ShapingInput;
    type Output = ShapingResult;

    const SLUG: &'static str = "increase-decrease-calculator";

    fn calculate(input: &ShapingInput) -> FiberResult<ShapingResult> {
        calculate(input)
    }

    fn present(output: &ShapingResult, units: UnitSystem) -> Vec<ResultLine> {
        vec![
            ResultLine::new("Instructions", output.instructions.clone()),
            ResultLine::quantity("Stitches after row", Dimension::Count, output.final_stitches as f64, units),
        ]
    }
}
