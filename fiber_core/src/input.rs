//! # Calculator Input State
//!
//! Every calculator keeps its input in a typed struct whose numeric fields
//! are described by a static [`FieldSpec`] table. Edits arrive as raw text
//! (what the user typed) and go through [`set_numeric`], which:
//!
//! 1. rejects anything that is not a finite number, keeping the old value
//! 2. converts from the display unit system to canonical units
//! 3. rounds integer fields and clamps to the declared `[min, max]`
//!
//! Enumerated fields go through [`set_choice`]; the input type decides which
//! options it accepts.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::calculations::gauge::GaugeInput;
//! use fiber_core::input::{set_numeric, EditOutcome, ToolInput};
//! use fiber_core::units::UnitSystem;
//!
//! let mut input = GaugeInput::default();
//! let before = input.get("pattern_stitches").unwrap();
//!
//! // Non-numeric text is ignored
//! let outcome = set_numeric(&mut input, "pattern_stitches", "lots", UnitSystem::Imperial);
//! assert!(matches!(outcome, EditOutcome::Rejected { .. }));
//! assert_eq!(input.get("pattern_stitches"), Some(before));
//!
//! // Out-of-range values are clamped
//! let outcome = set_numeric(&mut input, "pattern_stitches", "-5", UnitSystem::Imperial);
//! assert!(matches!(outcome, EditOutcome::Clamped { .. }));
//! ```

use std::fmt::Debug;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::units::{Dimension, UnitSystem};

/// Declared domain of one numeric input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSpec {
    /// Field key used by edit messages (e.g. "width_in")
    pub name: &'static str,
    /// Human-readable label
    pub label: &'static str,
    /// Physical dimension, drives unit projection
    pub dimension: Dimension,
    /// Lower bound in canonical units
    pub min: f64,
    /// Upper bound in canonical units
    pub max: f64,
    /// Whole numbers only
    pub integer: bool,
}

impl FieldSpec {
    /// A real-valued field
    pub const fn number(
        name: &'static str,
        label: &'static str,
        dimension: Dimension,
        min: f64,
        max: f64,
    ) -> Self {
        FieldSpec {
            name,
            label,
            dimension,
            min,
            max,
            integer: false,
        }
    }

    /// A whole-number count field
    pub const fn count(name: &'static str, label: &'static str, min: f64, max: f64) -> Self {
        FieldSpec {
            name,
            label,
            dimension: Dimension::Count,
            min,
            max,
            integer: true,
        }
    }

    /// Round (for integer fields) and clamp a canonical value into range.
    pub fn clamp(&self, value: f64) -> f64 {
        let value = if self.integer { value.round() } else { value };
        value.clamp(self.min, self.max)
    }
}

/// Declared domain of one enumerated input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChoiceSpec {
    pub name: &'static str,
    pub label: &'static str,
    /// Accepted option keys. Empty when the options depend on other fields.
    pub options: &'static [&'static str],
}

/// What happened to an edit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum EditOutcome {
    /// Value stored as entered
    Accepted,
    /// Value was out of range and stored at the nearest bound (canonical units)
    Clamped { requested: f64, applied: f64 },
    /// Edit ignored; previous value retained
    Rejected { reason: String },
}

impl EditOutcome {
    fn rejected(reason: impl Into<String>) -> Self {
        EditOutcome::Rejected {
            reason: reason.into(),
        }
    }

    /// Whether the input state changed (and the result must be recomputed)
    pub fn changed(&self) -> bool {
        !matches!(self, EditOutcome::Rejected { .. })
    }
}

/// Typed calculator input with named, range-checked fields.
///
/// Implementors keep `put` dumb: it stores whatever it is given. Range
/// enforcement lives in [`set_numeric`] so every tool clamps the same way.
pub trait ToolInput: Clone + Default + Debug + Serialize + DeserializeOwned {
    /// Numeric fields, in display order
    const FIELDS: &'static [FieldSpec];

    /// Enumerated fields, in display order
    const CHOICES: &'static [ChoiceSpec] = &[];

    /// Read a numeric field in canonical units
    fn get(&self, field: &str) -> Option<f64>;

    /// Store a numeric field (already clamped, canonical units)
    fn put(&mut self, field: &str, value: f64);

    /// Read an enumerated field's current option key
    fn choice(&self, _field: &str) -> Option<String> {
        None
    }

    /// Store an enumerated field. Returns false if the option is not accepted.
    fn put_choice(&mut self, _field: &str, _option: &str) -> bool {
        false
    }

    /// Options an enumerated field accepts in the current state
    fn options(&self, field: &str) -> Vec<String> {
        static_options::<Self>(field)
    }
}

/// Declared options of an enumerated field, empty for dynamic fields.
pub fn static_options<I: ToolInput>(field: &str) -> Vec<String> {
    choice_spec::<I>(field)
        .map(|spec| spec.options.iter().map(|o| o.to_string()).collect())
        .unwrap_or_default()
}

/// Look up the spec for a numeric field.
pub fn field_spec<I: ToolInput>(field: &str) -> Option<&'static FieldSpec> {
    I::FIELDS.iter().find(|spec| spec.name == field)
}

/// Look up the spec for an enumerated field.
pub fn choice_spec<I: ToolInput>(field: &str) -> Option<&'static ChoiceSpec> {
    I::CHOICES.iter().find(|spec| spec.name == field)
}

/// Parse user text as a finite number.
pub fn parse_number(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Apply a numeric edit typed in the `units` display system.
pub fn set_numeric<I: ToolInput>(input: &mut I, field: &str, text: &str, units: UnitSystem) -> EditOutcome {
    let Some(spec) = field_spec::<I>(field) else {
        return EditOutcome::rejected(format!("Unknown field '{}'", field));
    };
    let Some(displayed) = parse_number(text) else {
        return EditOutcome::rejected(format!("'{}' is not a number", text.trim()));
    };

    let requested = spec.dimension.to_canonical(displayed, units);
    let rounded = if spec.integer { requested.round() } else { requested };
    let applied = spec.clamp(requested);
    input.put(field, applied);

    if applied == rounded {
        EditOutcome::Accepted
    } else {
        EditOutcome::Clamped { requested, applied }
    }
}

/// Apply an enumerated edit.
pub fn set_choice<I: ToolInput>(input: &mut I, field: &str, option: &str) -> EditOutcome {
    let Some(spec) = choice_spec::<I>(field) else {
        return EditOutcome::rejected(format!("Unknown field '{}'", field));
    };
    let option = option.trim();
    if !spec.options.is_empty() && !spec.options.contains(&option) {
        return EditOutcome::rejected(format!(
            "'{}' is not one of: {}",
            option,
            spec.options.join(", ")
        ));
    }
    if input.put_choice(field, option) {
        EditOutcome::Accepted
    } else {
        EditOutcome::rejected(format!("'{}' is not valid for {}", option, spec.label))
    }
}
