//! # Unit Types
//!
//! Type-safe wrappers for the handful of units fiber crafts use, plus the
//! display projection between unit systems.
//!
//! ## Canonical Units
//!
//! Every input and result is stored in imperial units:
//! - Length: inches (in)
//! - Yarn length: yards (yd)
//! - Weight: ounces (oz)
//! - Density (sett, WPI, TPI): per inch
//!
//! Metric is a display-only projection. Toggling the unit system never
//! rewrites a stored value; it only changes what [`Dimension::to_display`]
//! returns.
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::units::{Centimeters, Dimension, Inches, UnitSystem};
//!
//! let width = Inches(10.0);
//! let cm: Centimeters = width.into();
//! assert!((cm.0 - 25.4).abs() < 1e-9);
//!
//! let shown = Dimension::Length.to_display(10.0, UnitSystem::Metric);
//! assert!((shown - 25.4).abs() < 1e-9);
//! ```

use std::fmt;
use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Centimeters per inch
pub const CM_PER_INCH: f64 = 2.54;
/// Meters per yard
pub const METERS_PER_YARD: f64 = 0.9144;
/// Grams per avoirdupois ounce
pub const GRAMS_PER_OUNCE: f64 = 28.349523125;

/// Which unit system values are displayed and entered in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnitSystem {
    #[default]
    Imperial,
    Metric,
}

impl UnitSystem {
    /// The other system
    pub fn toggled(self) -> Self {
        match self {
            UnitSystem::Imperial => UnitSystem::Metric,
            UnitSystem::Metric => UnitSystem::Imperial,
        }
    }
}

impl fmt::Display for UnitSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnitSystem::Imperial => write!(f, "imperial"),
            UnitSystem::Metric => write!(f, "metric"),
        }
    }
}

/// Physical dimension of a numeric field or result value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    /// Stitches, rows, ends; no unit
    Count,
    /// Fabric dimensions (in / cm)
    Length,
    /// Yarn amounts (yd / m)
    Yardage,
    /// Yarn weight (oz / g)
    Weight,
    /// Per-length densities such as sett, WPI, TPI (per in / per cm)
    Density,
    Percent,
    Angle,
    Ratio,
}

impl Dimension {
    /// Multiplier from canonical (imperial) to metric
    fn metric_factor(self) -> f64 {
        match self {
            Dimension::Length => CM_PER_INCH,
            Dimension::Yardage => METERS_PER_YARD,
            Dimension::Weight => GRAMS_PER_OUNCE,
            Dimension::Density => 1.0 / CM_PER_INCH,
            Dimension::Count | Dimension::Percent | Dimension::Angle | Dimension::Ratio => 1.0,
        }
    }

    /// Project a canonical value into the given display system.
    pub fn to_display(self, canonical: f64, system: UnitSystem) -> f64 {
        match system {
            UnitSystem::Imperial => canonical,
            UnitSystem::Metric => canonical * self.metric_factor(),
        }
    }

    /// Convert a value entered in the given display system back to canonical.
    pub fn to_canonical(self, displayed: f64, system: UnitSystem) -> f64 {
        match system {
            UnitSystem::Imperial => displayed,
            UnitSystem::Metric => displayed / self.metric_factor(),
        }
    }

    /// Unit suffix for display ("in", "cm", "yd", ...). Empty for counts and ratios.
    pub fn unit_label(self, system: UnitSystem) -> &'static str {
        match (self, system) {
            (Dimension::Length, UnitSystem::Imperial) => "in",
            (Dimension::Length, UnitSystem::Metric) => "cm",
            (Dimension::Yardage, UnitSystem::Imperial) => "yd",
            (Dimension::Yardage, UnitSystem::Metric) => "m",
            (Dimension::Weight, UnitSystem::Imperial) => "oz",
            (Dimension::Weight, UnitSystem::Metric) => "g",
            (Dimension::Density, UnitSystem::Imperial) => "per in",
            (Dimension::Density, UnitSystem::Metric) => "per cm",
            (Dimension::Percent, _) => "%",
            (Dimension::Angle, _) => "°",
            (Dimension::Count, _) | (Dimension::Ratio, _) => "",
        }
    }

    /// Format a canonical value for display, with unit suffix.
    pub fn format(self, canonical: f64, system: UnitSystem) -> String {
        let value = self.to_display(canonical, system);
        let label = self.unit_label(system);
        let number = match self {
            Dimension::Count => format!("{:.0}", value),
            Dimension::Ratio => format!("{:.3}", value),
            Dimension::Percent | Dimension::Angle => format!("{:.1}", value),
            _ => format!("{:.2}", value),
        };
        match label {
            "" => number,
            "%" | "°" => format!("{}{}", number, label),
            _ => format!("{} {}", number, label),
        }
    }
}

// ============================================================================
// Length Units
// ============================================================================

/// Length in inches
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Inches(pub f64);

/// Length in centimeters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Centimeters(pub f64);

impl From<Inches> for Centimeters {
    fn from(inches: Inches) -> Self {
        Centimeters(inches.0 * CM_PER_INCH)
    }
}

impl From<Centimeters> for Inches {
    fn from(cm: Centimeters) -> Self {
        Inches(cm.0 / CM_PER_INCH)
    }
}

// ============================================================================
// Yarn Length Units
// ============================================================================

/// Yarn length in yards
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Yards(pub f64);

/// Yarn length in meters
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Meters(pub f64);

impl From<Yards> for Meters {
    fn from(yd: Yards) -> Self {
        Meters(yd.0 * METERS_PER_YARD)
    }
}

impl From<Meters> for Yards {
    fn from(m: Meters) -> Self {
        Yards(m.0 / METERS_PER_YARD)
    }
}

impl From<Inches> for Yards {
    fn from(inches: Inches) -> Self {
        Yards(inches.0 / 36.0)
    }
}

// ============================================================================
// Weight Units
// ============================================================================

/// Weight in ounces
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ounces(pub f64);

/// Weight in grams
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Grams(pub f64);

impl From<Ounces> for Grams {
    fn from(oz: Ounces) -> Self {
        Grams(oz.0 * GRAMS_PER_OUNCE)
    }
}

impl From<Grams> for Ounces {
    fn from(g: Grams) -> Self {
        Ounces(g.0 / GRAMS_PER_OUNCE)
    }
}

// ============================================================================
// Arithmetic Implementations (macro to reduce boilerplate)
// ============================================================================

macro_rules! impl_arithmetic {
    ($type:ty) => {
        impl Add for $type {
            type Output = Self;
            fn add(self, rhs: Self) -> Self::Output {
                Self(self.0 + rhs.0)
            }
        }

        impl Sub for $type {
            type Output = Self;
            fn sub(self, rhs: Self) -> Self::Output {
                Self(self.0 - rhs.0)
            }
        }

        impl Mul<f64> for $type {
            type Output = Self;
            fn mul(self, rhs: f64) -> Self::Output {
                Self(self.0 * rhs)
            }
        }

        impl Div<f64> for $type {
            type Output = Self;
            fn div(self, rhs: f64) -> Self::Output {
                Self(self.0 / rhs)
            }
        }

        impl $type {
            /// Get the raw f64 value
            pub fn value(self) -> f64 {
                self.0
            }
        }
    };
}

impl_arithmetic!(Inches);
impl_arithmetic!(Centimeters);
impl_arithmetic!(Yards);
impl_arithmetic!(Meters);
impl_arithmetic!(Ounces);
impl_arithmetic!(Grams);

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_DIMENSIONS: [Dimension; 8] = [
        Dimension::Count,
        Dimension::Length,
        Dimension::Yardage,
        Dimension::Weight,
        Dimension::Density,
        Dimension::Percent,
        Dimension::Angle,
        Dimension::Ratio,
    ];

    #[test]
    fn test_inches_to_centimeters() {
        let cm: Centimeters = Inches(4.0).into();
        assert!((cm.0 - 10.16).abs() < 1e-9);
    }

    #[test]
    fn test_yards_to_meters() {
        let m: Meters = Yards(100.0).into();
        assert!((m.0 - 91.44).abs() < 1e-9);
        let yd: Yards = Inches(72.0).into();
        assert_eq!(yd.0, 2.0);
    }

    #[test]
    fn test_ounces_to_grams() {
        let g: Grams = Ounces(3.5).into();
        assert!((g.0 - 99.223).abs() < 0.001);
    }

    #[test]
    fn test_roundtrip_all_dimensions() {
        for dim in ALL_DIMENSIONS {
            for &value in &[0.0, 0.25, 1.0, 3.75, 42.0, 1234.5, 99999.0] {
                let metric = dim.to_display(value, UnitSystem::Metric);
                let back = dim.to_canonical(metric, UnitSystem::Metric);
                let tolerance = 1e-9 * value.abs().max(1.0);
                assert!((back - value).abs() <= tolerance, "{:?} {}", dim, value);
            }
        }
    }

    #[test]
    fn test_imperial_display_is_identity() {
        for dim in ALL_DIMENSIONS {
            assert_eq!(dim.to_display(7.5, UnitSystem::Imperial), 7.5);
            assert_eq!(dim.to_canonical(7.5, UnitSystem::Imperial), 7.5);
        }
    }

    #[test]
    fn test_format() {
        assert_eq!(Dimension::Length.format(10.0, UnitSystem::Imperial), "10.00 in");
        assert_eq!(Dimension::Length.format(10.0, UnitSystem::Metric), "25.40 cm");
        assert_eq!(Dimension::Count.format(132.0, UnitSystem::Metric), "132");
        assert_eq!(Dimension::Percent.format(12.5, UnitSystem::Imperial), "12.5%");
    }

    #[test]
    fn test_arithmetic() {
        let a = Yards(10.0);
        let b = Yards(5.0);
        assert_eq!((a + b).0, 15.0);
        assert_eq!((a - b).0, 5.0);
        assert_eq!((a * 2.0).0, 20.0);
        assert_eq!((a / 2.0).0, 5.0);
    }

    #[test]
    fn test_unit_system_serialization() {
        let json = serde_json::to_string(&UnitSystem::Metric).unwrap();
        assert_eq!(json, "\"metric\"");
        assert_eq!(UnitSystem::Metric.toggled(), UnitSystem::Imperial);
    }
}
