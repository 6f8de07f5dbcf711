//! # Needle & Hook Size Conversion
//!
//! Fixed lookup tables mapping knitting needle and crochet hook sizes between
//! metric (mm), US, UK and Japanese designations.
//!
//! ## Tables
//!
//! - Metric is the key of every row; US and UK are listed where a size
//!   exists in that system.
//! - Japanese knitting needles run JP 0 = 2.1 mm up to JP 15 = 6.6 mm in
//!   0.3 mm steps, so they rarely land on a metric row exactly. A Japanese
//!   size is paired with a row when it is within [`JAPANESE_TOLERANCE_MM`].
//! - Japanese crochet hooks use the `n/0` designation.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::calculations::needles::{convert, NeedleKind, NeedleSystem};
//!
//! let conversion = convert(NeedleKind::Knitting, NeedleSystem::Us, "8").unwrap();
//! assert_eq!(conversion.metric, "5.0 mm");
//! assert_eq!(conversion.uk.as_deref(), Some("6"));
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Calculator, ResultLine};
use crate::errors::{FiberError, FiberResult};
use crate::input::{static_options, ChoiceSpec, FieldSpec, ToolInput};
use crate::units::UnitSystem;

/// Maximum distance between a Japanese size and a metric row to pair them
pub const JAPANESE_TOLERANCE_MM: f64 = 0.1;

/// Two metric entries closer than this are the same size
const METRIC_MATCH_MM: f64 = 0.01;

/// Knitting needles or crochet hooks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedleKind {
    #[default]
    Knitting,
    Crochet,
}

impl NeedleKind {
    pub const ALL: [NeedleKind; 2] = [NeedleKind::Knitting, NeedleKind::Crochet];

    pub fn key(&self) -> &'static str {
        match self {
            NeedleKind::Knitting => "knitting",
            NeedleKind::Crochet => "crochet",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.key().eq_ignore_ascii_case(key.trim()))
    }

    fn rows(&self) -> &'static [SizeRow] {
        match self {
            NeedleKind::Knitting => KNITTING_SIZES,
            NeedleKind::Crochet => CROCHET_SIZES,
        }
    }

    fn japanese(&self) -> &'static [(&'static str, f64)] {
        match self {
            NeedleKind::Knitting => JAPANESE_KNITTING,
            NeedleKind::Crochet => JAPANESE_CROCHET,
        }
    }
}

/// Sizing system a size label is written in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NeedleSystem {
    #[default]
    Us,
    Uk,
    Metric,
    Japanese,
}

impl NeedleSystem {
    pub const ALL: [NeedleSystem; 4] = [
        NeedleSystem::Us,
        NeedleSystem::Uk,
        NeedleSystem::Metric,
        NeedleSystem::Japanese,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            NeedleSystem::Us => "us",
            NeedleSystem::Uk => "uk",
            NeedleSystem::Metric => "metric",
            NeedleSystem::Japanese => "japanese",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.key().eq_ignore_ascii_case(key.trim()))
    }

    /// Get display name for UI
    pub fn display_name(&self) -> &'static str {
        match self {
            NeedleSystem::Us => "US",
            NeedleSystem::Uk => "UK",
            NeedleSystem::Metric => "Metric",
            NeedleSystem::Japanese => "Japanese",
        }
    }
}

impl fmt::Display for NeedleSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// One row of a conversion table
#[derive(Debug, Clone, Copy)]
struct SizeRow {
    mm: f64,
    us: Option<&'static str>,
    uk: Option<&'static str>,
}

const fn row(mm: f64, us: Option<&'static str>, uk: Option<&'static str>) -> SizeRow {
    SizeRow { mm, us, uk }
}

const KNITTING_SIZES: &[SizeRow] = &[
    row(2.0, Some("0"), Some("14")),
    row(2.25, Some("1"), Some("13")),
    row(2.75, Some("2"), Some("12")),
    row(3.0, None, Some("11")),
    row(3.25, Some("3"), Some("10")),
    row(3.5, Some("4"), None),
    row(3.75, Some("5"), Some("9")),
    row(4.0, Some("6"), Some("8")),
    row(4.5, Some("7"), Some("7")),
    row(5.0, Some("8"), Some("6")),
    row(5.5, Some("9"), Some("5")),
    row(6.0, Some("10"), Some("4")),
    row(6.5, Some("10.5"), Some("3")),
    row(7.0, None, Some("2")),
    row(7.5, None, Some("1")),
    row(8.0, Some("11"), Some("0")),
    row(9.0, Some("13"), Some("00")),
    row(10.0, Some("15"), Some("000")),
    row(12.0, Some("17"), None),
    row(15.0, Some("19"), None),
    row(19.0, Some("35"), None),
    row(25.0, Some("50"), None),
];

const CROCHET_SIZES: &[SizeRow] = &[
    row(2.25, Some("B-1"), Some("13")),
    row(2.75, Some("C-2"), Some("12")),
    row(3.25, Some("D-3"), Some("10")),
    row(3.5, Some("E-4"), Some("9")),
    row(3.75, Some("F-5"), None),
    row(4.0, Some("G-6"), Some("8")),
    row(4.5, Some("7"), Some("7")),
    row(5.0, Some("H-8"), Some("6")),
    row(5.5, Some("I-9"), Some("5")),
    row(6.0, Some("J-10"), Some("4")),
    row(6.5, Some("K-10.5"), Some("3")),
    row(8.0, Some("L-11"), Some("0")),
    row(9.0, Some("M/N-13"), Some("00")),
    row(10.0, Some("N/P-15"), Some("000")),
    row(15.0, Some("P/Q"), None),
    row(16.0, Some("Q"), None),
    row(19.0, Some("S"), None),
];

const JAPANESE_KNITTING: &[(&str, f64)] = &[
    ("0", 2.1),
    ("1", 2.4),
    ("2", 2.7),
    ("3", 3.0),
    ("4", 3.3),
    ("5", 3.6),
    ("6", 3.9),
    ("7", 4.2),
    ("8", 4.5),
    ("9", 4.8),
    ("10", 5.1),
    ("11", 5.4),
    ("12", 5.7),
    ("13", 6.0),
    ("14", 6.3),
    ("15", 6.6),
];

const JAPANESE_CROCHET: &[(&str, f64)] = &[
    ("2/0", 2.0),
    ("3/0", 2.3),
    ("4/0", 2.5),
    ("5/0", 3.0),
    ("6/0", 3.5),
    ("7/0", 4.0),
    ("7.5/0", 4.5),
    ("8/0", 5.0),
    ("9/0", 5.5),
    ("10/0", 6.0),
];

/// Format a diameter the way needle packaging does ("5.0", "2.25")
pub fn format_mm(mm: f64) -> String {
    let tenths = mm * 10.0;
    if (tenths - tenths.round()).abs() < 1e-6 {
        format!("{:.1}", mm)
    } else {
        format!("{:.2}", mm)
    }
}

/// Closest Japanese size within tolerance of a metric diameter
fn japanese_for(kind: NeedleKind, mm: f64) -> Option<&'static str> {
    kind.japanese()
        .iter()
        .map(|&(label, jp_mm)| (label, (jp_mm - mm).abs()))
        .filter(|&(_, diff)| diff <= JAPANESE_TOLERANCE_MM + 1e-9)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(label, _)| label)
}

impl SizeRow {
    fn label(&self, kind: NeedleKind, system: NeedleSystem) -> Option<String> {
        match system {
            NeedleSystem::Us => self.us.map(str::to_string),
            NeedleSystem::Uk => self.uk.map(str::to_string),
            NeedleSystem::Metric => Some(format_mm(self.mm)),
            NeedleSystem::Japanese => japanese_for(kind, self.mm).map(str::to_string),
        }
    }
}

/// Does a typed US label match a table label? Crochet labels like "H-8"
/// also match "h-8", "H" and "8". Combined letters match either half, so
/// "M/N-13" matches "M", "N" and "M/N"; a letter shared by two rows picks
/// the smaller hook.
fn us_label_matches(table: &str, typed: &str) -> bool {
    if table.eq_ignore_ascii_case(typed) {
        return true;
    }
    let (letters, number) = match table.split_once('-') {
        Some((letters, number)) => (letters, Some(number)),
        None => (table, None),
    };
    number == Some(typed)
        || letters.eq_ignore_ascii_case(typed)
        || letters.split('/').any(|letter| letter.eq_ignore_ascii_case(typed))
}

fn find_row(kind: NeedleKind, system: NeedleSystem, size: &str) -> Option<&'static SizeRow> {
    let typed = size.trim();
    let rows = kind.rows();
    match system {
        NeedleSystem::Us => rows
            .iter()
            .find(|r| r.us.is_some_and(|us| us.eq_ignore_ascii_case(typed)))
            .or_else(|| rows.iter().find(|r| r.us.is_some_and(|us| us_label_matches(us, typed)))),
        NeedleSystem::Uk => rows.iter().find(|r| r.uk == Some(typed)),
        NeedleSystem::Metric => {
            let number = typed.trim_end_matches("mm").trim();
            let mm: f64 = number.parse().ok()?;
            rows.iter().find(|r| (r.mm - mm).abs() < METRIC_MATCH_MM)
        }
        NeedleSystem::Japanese => {
            let &(_, jp_mm) = kind.japanese().iter().find(|(label, _)| *label == typed)?;
            rows.iter()
                .filter(|r| (r.mm - jp_mm).abs() <= JAPANESE_TOLERANCE_MM + 1e-9)
                .min_by(|a, b| (a.mm - jp_mm).abs().total_cmp(&(b.mm - jp_mm).abs()))
        }
    }
}

/// All size labels available in a system, smallest first.
pub fn sizes(kind: NeedleKind, system: NeedleSystem) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for size_row in kind.rows() {
        if let Some(label) = size_row.label(kind, system) {
            if !labels.contains(&label) {
                labels.push(label);
            }
        }
    }
    labels
}

/// A size expressed in every system.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedleConversion {
    pub kind: NeedleKind,
    /// Diameter in millimeters
    pub metric_mm: f64,
    /// Display form, e.g. "5.0 mm"
    pub metric: String,
    pub us: Option<String>,
    pub uk: Option<String>,
    pub japanese: Option<String>,
}

/// Convert a size label from one system to all others.
pub fn convert(kind: NeedleKind, system: NeedleSystem, size: &str) -> FiberResult<NeedleConversion> {
    let size_row = find_row(kind, system, size)
        .ok_or_else(|| FiberError::unknown_size(system.display_name(), size.trim()))?;

    Ok(NeedleConversion {
        kind,
        metric_mm: size_row.mm,
        metric: format!("{} mm", format_mm(size_row.mm)),
        us: size_row.label(kind, NeedleSystem::Us),
        uk: size_row.label(kind, NeedleSystem::Uk),
        japanese: size_row.label(kind, NeedleSystem::Japanese),
    })
}

/// Input for the needle converter.
///
/// ## JSON Example
///
/// ```json
/// { "kind": "knitting", "system": "us", "size": "8" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NeedleInput {
    pub kind: NeedleKind,
    pub system: NeedleSystem,
    /// Size label in `system` (e.g. "8", "H-8", "5.0", "10/0")
    pub size: String,
}

impl Default for NeedleInput {
    fn default() -> Self {
        NeedleInput {
            kind: NeedleKind::Knitting,
            system: NeedleSystem::Us,
            size: "8".to_string(),
        }
    }
}

impl NeedleInput {
    /// Re-express the current size after the kind or system changed.
    /// Falls back to the smallest size when there is no equivalent.
    fn reexpress(&mut self, old_kind: NeedleKind, old_system: NeedleSystem) {
        let equivalent = find_row(old_kind, old_system, &self.size).and_then(|old_row| {
            self.kind
                .rows()
                .iter()
                .find(|r| (r.mm - old_row.mm).abs() < METRIC_MATCH_MM)
                .and_then(|r| r.label(self.kind, self.system))
        });
        self.size = equivalent
            .or_else(|| sizes(self.kind, self.system).into_iter().next())
            .unwrap_or_default();
    }
}

impl ToolInput for NeedleInput {
    const FIELDS: &'static [FieldSpec] = &[];
    const CHOICES: &'static [ChoiceSpec] = &[
        ChoiceSpec {
            name: "kind",
            label: "Needle type",
            options: &["knitting", "crochet"],
        },
        ChoiceSpec {
            name: "system",
            label: "Sizing system",
            options: &["us", "uk", "metric", "japanese"],
        },
        ChoiceSpec {
            name: "size",
            label: "Size",
            options: &[],
        },
    ];

    fn get(&self, _field: &str) -> Option<f64> {
        None
    }

    fn put(&mut self, _field: &str, _value: f64) {}

    fn choice(&self, field: &str) -> Option<String> {
        match field {
            "kind" => Some(self.kind.key().to_string()),
            "system" => Some(self.system.key().to_string()),
            "size" => Some(self.size.clone()),
            _ => None,
        }
    }

    fn put_choice(&mut self, field: &str, option: &str) -> bool {
        let (old_kind, old_system) = (self.kind, self.system);
        match field {
            "kind" => match NeedleKind::from_key(option) {
                Some(kind) => {
                    self.kind = kind;
                    self.reexpress(old_kind, old_system);
                    true
                }
                None => false,
            },
            "system" => match NeedleSystem::from_key(option) {
                Some(system) => {
                    self.system = system;
                    self.reexpress(old_kind, old_system);
                    true
                }
                None => false,
            },
            "size" => match find_row(self.kind, self.system, option) {
                // Store the table's spelling, not the user's
                Some(size_row) => match size_row.label(self.kind, self.system) {
                    Some(label) => {
                        self.size = label;
                        true
                    }
                    None => false,
                },
                None => false,
            },
            _ => false,
        }
    }

    fn options(&self, field: &str) -> Vec<String> {
        match field {
            "size" => sizes(self.kind, self.system),
            other => static_options::<Self>(other),
        }
    }
}

/// Calculate a conversion from the input state.
pub fn calculate(input: &NeedleInput) -> FiberResult<NeedleConversion> {
    convert(input.kind, input.system, &input.size)
}

/// Needle/hook size converter tool
pub struct NeedleConverter;

impl Calculator for NeedleConverter {
    type Input = NeedleInput;
    type Output = NeedleConversion;

    const SLUG: &'static str = "needle-size-converter";

    fn calculate(input: &NeedleInput) -> FiberResult<NeedleConversion> {
        calculate(input)
    }

    fn present(output: &NeedleConversion, _units: UnitSystem) -> Vec<ResultLine> {
        let or_dash = |label: &Option<String>| label.clone().unwrap_or_else(|| "—".to_string());
        vec![
            ResultLine::new("Metric", output.metric.clone()),
            ResultLine::new("US", or_dash(&output.us)),
            ResultLine::new("UK", or_dash(&output.uk)),
            ResultLine::new("Japanese", or_dash(&output.japanese)),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{set_choice, EditOutcome};

    #[test]
    fn test_us_8_knitting() {
        let c = convert(NeedleKind::Knitting, NeedleSystem::Us, "8").unwrap();
        assert_eq!(c.metric, "5.0 mm");
        assert_eq!(c.uk.as_deref(), Some("6"));
        assert_eq!(c.japanese.as_deref(), Some("10"));
    }

    #[test]
    fn test_metric_lookup_variants() {
        for typed in ["5", "5.0", "5.00", "5.0 mm", "5mm"] {
            let c = convert(NeedleKind::Knitting, NeedleSystem::Metric, typed).unwrap();
            assert_eq!(c.us.as_deref(), Some("8"), "typed {}", typed);
        }
    }

    #[test]
    fn test_quarter_millimeter_format() {
        let c = convert(NeedleKind::Knitting, NeedleSystem::Us, "1").unwrap();
        assert_eq!(c.metric, "2.25 mm");
    }

    #[test]
    fn test_uk_to_us() {
        let c = convert(NeedleKind::Knitting, NeedleSystem::Uk, "000").unwrap();
        assert_eq!(c.us.as_deref(), Some("15"));
        assert_eq!(c.metric_mm, 10.0);
    }

    #[test]
    fn test_missing_system_entries() {
        // 3.0 mm has no US size, 3.5 mm has no UK size
        let c = convert(NeedleKind::Knitting, NeedleSystem::Uk, "11").unwrap();
        assert!(c.us.is_none());
        let c = convert(NeedleKind::Knitting, NeedleSystem::Us, "4").unwrap();
        assert!(c.uk.is_none());
    }

    #[test]
    fn test_japanese_knitting() {
        let c = convert(NeedleKind::Knitting, NeedleSystem::Japanese, "13").unwrap();
        assert_eq!(c.metric, "6.0 mm");
        assert_eq!(c.us.as_deref(), Some("10"));
        assert!(convert(NeedleKind::Knitting, NeedleSystem::Japanese, "20").is_err());
    }

    #[test]
    fn test_crochet_letters() {
        for typed in ["H-8", "h-8", "H", "8"] {
            let c = convert(NeedleKind::Crochet, NeedleSystem::Us, typed).unwrap();
            assert_eq!(c.metric, "5.0 mm", "typed {}", typed);
        }
        let c = convert(NeedleKind::Crochet, NeedleSystem::Us, "7").unwrap();
        assert_eq!(c.metric, "4.5 mm");
        assert_eq!(c.japanese.as_deref(), Some("7.5/0"));
    }

    #[test]
    fn test_combined_crochet_letters() {
        for typed in ["M/N-13", "m/n", "M", "13"] {
            let c = convert(NeedleKind::Crochet, NeedleSystem::Us, typed).unwrap();
            assert_eq!(c.metric, "9.0 mm", "typed {}", typed);
        }
        // N is shared by M/N-13 and N/P-15
        let c = convert(NeedleKind::Crochet, NeedleSystem::Us, "N").unwrap();
        assert_eq!(c.metric, "9.0 mm");
        // an exact label beats a combined one
        let c = convert(NeedleKind::Crochet, NeedleSystem::Us, "Q").unwrap();
        assert_eq!(c.metric, "16.0 mm");
    }

    #[test]
    fn test_unknown_size() {
        let err = convert(NeedleKind::Knitting, NeedleSystem::Us, "99").unwrap_err();
        assert_eq!(err.error_code(), "UNKNOWN_SIZE");
    }

    #[test]
    fn test_every_listed_size_converts() {
        for kind in NeedleKind::ALL {
            for system in NeedleSystem::ALL {
                for label in sizes(kind, system) {
                    let c = convert(kind, system, &label).unwrap();
                    let back = match system {
                        NeedleSystem::Us => c.us,
                        NeedleSystem::Uk => c.uk,
                        NeedleSystem::Metric => Some(format_mm(c.metric_mm)),
                        NeedleSystem::Japanese => c.japanese,
                    };
                    assert_eq!(back.as_deref(), Some(label.as_str()), "{:?} {:?}", kind, system);
                }
            }
        }
    }

    #[test]
    fn test_system_switch_reexpresses_size() {
        let mut input = NeedleInput::default();
        assert_eq!(set_choice(&mut input, "system", "metric"), EditOutcome::Accepted);
        assert_eq!(input.size, "5.0");
        set_choice(&mut input, "system", "uk");
        assert_eq!(input.size, "6");
    }

    #[test]
    fn test_system_switch_without_equivalent() {
        let mut input = NeedleInput::default();
        set_choice(&mut input, "size", "4"); // 3.5 mm, no UK size
        set_choice(&mut input, "system", "uk");
        assert_eq!(input.size, "14");
    }

    #[test]
    fn test_invalid_size_edit_keeps_previous() {
        let mut input = NeedleInput::default();
        let outcome = set_choice(&mut input, "size", "banana");
        assert!(!outcome.changed());
        assert_eq!(input.size, "8");
    }

    #[test]
    fn test_size_edit_normalizes_label() {
        let mut input = NeedleInput {
            kind: NeedleKind::Crochet,
            system: NeedleSystem::Us,
            size: "H-8".to_string(),
        };
        set_choice(&mut input, "size", "j");
        assert_eq!(input.size, "J-10");
    }

    #[test]
    fn test_size_options_follow_system() {
        let mut input = NeedleInput::default();
        assert_eq!(input.options("kind"), vec!["knitting", "crochet"]);
        assert!(input.options("size").contains(&"8".to_string()));

        set_choice(&mut input, "system", "metric");
        assert_eq!(input.options("size"), sizes(NeedleKind::Knitting, NeedleSystem::Metric));
        assert!(input.options("size").contains(&input.size));
    }
}
