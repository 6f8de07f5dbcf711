//! # Tool Sessions
//!
//! A session owns one calculator's input state, the display unit system and
//! the latest result. The front end sends [`SessionMessage`]s; every accepted
//! change recomputes the result before `handle` returns, so the displayed
//! result never lags the input.
//!
//! Inputs are stored in canonical (imperial) units. Switching the display
//! system only changes how fields and results are projected.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::calculations::yardage::YardageCalculator;
//! use fiber_core::session::{SessionMessage, ToolSession};
//!
//! let mut session = ToolSession::<YardageCalculator>::new(Default::default());
//! session.handle(SessionMessage::set_number("width_in", "10"));
//! assert!(session.result().is_ok());
//!
//! session.handle(SessionMessage::ToggleUnits);
//! assert_eq!(session.display_value("width_in"), Some(25.4));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::calculations::cross_stitch::CrossStitchCalculator;
use crate::calculations::gauge::GaugeCalculator;
use crate::calculations::needles::NeedleConverter;
use crate::calculations::shaping::ShapingCalculator;
use crate::calculations::spinning::SpinningCalculator;
use crate::calculations::weaving::WeavingCalculator;
use crate::calculations::yardage::YardageCalculator;
use crate::calculations::{Calculator, ResultLine};
use crate::errors::{FiberError, FiberResult};
use crate::input::{self, ChoiceSpec, EditOutcome, FieldSpec, ToolInput};
use crate::units::UnitSystem;

/// An edit or display change from the front end.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessage {
    /// Raw text typed into a numeric field, in the display unit system
    SetNumber { field: String, text: String },
    SetChoice { field: String, value: String },
    ToggleUnits,
    SetUnits { units: UnitSystem },
    /// Restore the tool's default input
    Reset,
}

impl SessionMessage {
    pub fn set_number(field: impl Into<String>, text: impl Into<String>) -> Self {
        SessionMessage::SetNumber {
            field: field.into(),
            text: text.into(),
        }
    }

    pub fn set_choice(field: impl Into<String>, value: impl Into<String>) -> Self {
        SessionMessage::SetChoice {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Live state for one calculator.
pub struct ToolSession<C: Calculator> {
    input: C::Input,
    units: UnitSystem,
    outcome: FiberResult<C::Output>,
}

impl<C: Calculator> ToolSession<C> {
    pub fn new(units: UnitSystem) -> Self {
        Self::with_input(C::Input::default(), units)
    }

    pub fn with_input(input: C::Input, units: UnitSystem) -> Self {
        let outcome = C::calculate(&input);
        ToolSession { input, units, outcome }
    }

    pub fn input(&self) -> &C::Input {
        &self.input
    }

    pub fn units(&self) -> UnitSystem {
        self.units
    }

    /// Latest result, or the configuration error that disables it
    pub fn result(&self) -> Result<&C::Output, &FiberError> {
        self.outcome.as_ref()
    }

    fn recompute(&mut self) {
        self.outcome = C::calculate(&self.input);
        if let Err(e) = &self.outcome {
            debug!(tool = C::SLUG, error = %e, "result disabled");
        }
    }

    /// Apply one message. Rejected edits leave input and result untouched.
    pub fn handle(&mut self, message: SessionMessage) -> EditOutcome {
        let outcome = match &message {
            SessionMessage::SetNumber { field, text } => input::set_numeric(&mut self.input, field, text, self.units),
            SessionMessage::SetChoice { field, value } => input::set_choice(&mut self.input, field, value),
            SessionMessage::ToggleUnits => {
                self.units = self.units.toggled();
                return EditOutcome::Accepted;
            }
            SessionMessage::SetUnits { units } => {
                self.units = *units;
                return EditOutcome::Accepted;
            }
            SessionMessage::Reset => {
                self.input = C::Input::default();
                EditOutcome::Accepted
            }
        };

        if outcome.changed() {
            self.recompute();
        }
        debug!(tool = C::SLUG, ?message, ?outcome, "session message handled");
        outcome
    }

    /// A numeric field projected into the display unit system
    pub fn display_value(&self, field: &str) -> Option<f64> {
        let spec = input::field_spec::<C::Input>(field)?;
        let canonical = self.input.get(field)?;
        Some(spec.dimension.to_display(canonical, self.units))
    }

    /// Result lines, or the message explaining why there is no result
    pub fn lines(&self) -> Result<Vec<ResultLine>, String> {
        match &self.outcome {
            Ok(output) => Ok(C::present(output, self.units)),
            Err(e) => Err(e.to_string()),
        }
    }
}

/// A session with its calculator type erased, for slug-driven front ends.
pub trait Session {
    fn slug(&self) -> &'static str;

    fn handle(&mut self, message: SessionMessage) -> EditOutcome;

    fn units(&self) -> UnitSystem;

    fn fields(&self) -> &'static [FieldSpec];

    fn choices(&self) -> &'static [ChoiceSpec];

    fn display_value(&self, field: &str) -> Option<f64>;

    fn choice_value(&self, field: &str) -> Option<String>;

    fn choice_options(&self, field: &str) -> Vec<String>;

    fn lines(&self) -> Result<Vec<ResultLine>, String>;

    fn input_json(&self) -> FiberResult<serde_json::Value>;

    /// Result as JSON, or the error that disables it
    fn result_json(&self) -> FiberResult<serde_json::Value>;
}

impl<C: Calculator> Session for ToolSession<C> {
    fn slug(&self) -> &'static str {
        C::SLUG
    }

    fn handle(&mut self, message: SessionMessage) -> EditOutcome {
        ToolSession::handle(self, message)
    }

    fn units(&self) -> UnitSystem {
        self.units
    }

    fn fields(&self) -> &'static [FieldSpec] {
        C::Input::FIELDS
    }

    fn choices(&self) -> &'static [ChoiceSpec] {
        C::Input::CHOICES
    }

    fn display_value(&self, field: &str) -> Option<f64> {
        ToolSession::display_value(self, field)
    }

    fn choice_value(&self, field: &str) -> Option<String> {
        self.input.choice(field)
    }

    fn choice_options(&self, field: &str) -> Vec<String> {
        self.input.options(field)
    }

    fn lines(&self) -> Result<Vec<ResultLine>, String> {
        ToolSession::lines(self)
    }

    fn input_json(&self) -> FiberResult<serde_json::Value> {
        serde_json::to_value(&self.input).map_err(|e| FiberError::serialization(e.to_string()))
    }

    fn result_json(&self) -> FiberResult<serde_json::Value> {
        match &self.outcome {
            Ok(output) => serde_json::to_value(output).map_err(|e| FiberError::serialization(e.to_string())),
            Err(e) => Err(e.clone()),
        }
    }
}

impl fmt::Debug for dyn Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("slug", &self.slug())
            .field("units", &self.units())
            .finish()
    }
}

fn boxed<C: Calculator + 'static>(units: UnitSystem) -> Box<dyn Session> {
    Box::new(ToolSession::<C>::new(units))
}

/// Open a session for a calculator tool by slug.
///
/// Tools without a calculator (counter, stripes) and unknown slugs give
/// [`FiberError::UnknownTool`].
pub fn open_session(slug: &str, units: UnitSystem) -> FiberResult<Box<dyn Session>> {
    let session = match slug {
        s if s == NeedleConverter::SLUG => boxed::<NeedleConverter>(units),
        s if s == GaugeCalculator::SLUG => boxed::<GaugeCalculator>(units),
        s if s == YardageCalculator::SLUG => boxed::<YardageCalculator>(units),
        s if s == CrossStitchCalculator::SLUG => boxed::<CrossStitchCalculator>(units),
        s if s == WeavingCalculator::SLUG => boxed::<WeavingCalculator>(units),
        s if s == SpinningCalculator::SLUG => boxed::<SpinningCalculator>(units),
        s if s == ShapingCalculator::SLUG => boxed::<ShapingCalculator>(units),
        _ => return Err(FiberError::unknown_tool(slug)),
    };
    debug!(slug, %units, "session opened");
    Ok(session)
}

/// Slugs that [`open_session`] accepts
pub const CALCULATOR_SLUGS: &[&str] = &[
    NeedleConverter::SLUG,
    GaugeCalculator::SLUG,
    YardageCalculator::SLUG,
    CrossStitchCalculator::SLUG,
    WeavingCalculator::SLUG,
    SpinningCalculator::SLUG,
    ShapingCalculator::SLUG,
];
