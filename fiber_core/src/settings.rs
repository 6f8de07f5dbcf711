//! User settings, read from a TOML file.
//!
//! ```toml
//! units = "metric"
//! history_capacity = 100
//! data_dir = "/home/me/.local/share/fibertools"
//!
//! [stripes]
//! min_width = 2
//! max_width = 8
//! yards_per_row = 1.25
//! ```
//!
//! Every key is optional. A missing file means defaults.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::counter::DEFAULT_HISTORY_CAPACITY;
use crate::errors::{FiberError, FiberResult};
use crate::stripes::StripeInput;
use crate::units::UnitSystem;

/// Stripe generator defaults used when a flag is not given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StripeDefaults {
    pub min_width: u32,
    pub max_width: u32,
    pub yards_per_row: f64,
}

impl Default for StripeDefaults {
    fn default() -> Self {
        let input = StripeInput::default();
        StripeDefaults {
            min_width: input.min_width,
            max_width: input.max_width,
            yards_per_row: input.yards_per_row,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Display unit system for calculator sessions
    #[serde(default)]
    pub units: UnitSystem,

    /// Undo steps kept per counter
    #[serde(default = "default_history_capacity")]
    pub history_capacity: usize,

    #[serde(default)]
    pub stripes: StripeDefaults,

    /// Where counters and consent are stored; platform data dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            units: UnitSystem::default(),
            history_capacity: DEFAULT_HISTORY_CAPACITY,
            stripes: StripeDefaults::default(),
            data_dir: None,
        }
    }
}

impl Settings {
    pub fn from_toml_str(content: &str) -> FiberResult<Self> {
        let settings: Settings = toml::from_str(content)
            .map_err(|e| FiberError::serialization(format!("Invalid settings: {}", e)))?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn to_toml_string(&self) -> FiberResult<String> {
        toml::to_string_pretty(self).map_err(|e| FiberError::serialization(e.to_string()))
    }

    /// Load from `path`; a missing file gives defaults.
    pub fn load(path: &Path) -> FiberResult<Self> {
        match fs::read_to_string(path) {
            Ok(content) => Self::from_toml_str(&content),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(FiberError::file_error("read", path.display().to_string(), e.to_string())),
        }
    }

    pub fn validate(&self) -> FiberResult<()> {
        if self.history_capacity == 0 {
            return Err(FiberError::invalid_configuration("history_capacity must be at least 1"));
        }
        if self.stripes.min_width == 0 || self.stripes.min_width > self.stripes.max_width {
            return Err(FiberError::invalid_configuration(
                "stripes.min_width must be at least 1 and no larger than stripes.max_width",
            ));
        }
        if !(self.stripes.yards_per_row.is_finite() && self.stripes.yards_per_row >= 0.0) {
            return Err(FiberError::invalid_configuration("stripes.yards_per_row cannot be negative"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        assert_eq!(Settings::from_toml_str("").unwrap(), Settings::default());
    }

    #[test]
    fn test_partial_file() {
        let settings = Settings::from_toml_str("units = \"metric\"\n[stripes]\nmax_width = 20\n").unwrap();
        assert_eq!(settings.units, UnitSystem::Metric);
        assert_eq!(settings.history_capacity, DEFAULT_HISTORY_CAPACITY);
        assert_eq!(settings.stripes.max_width, 20);
        assert_eq!(settings.stripes.min_width, StripeDefaults::default().min_width);
    }

    #[test]
    fn test_malformed_file() {
        let err = Settings::from_toml_str("units = [").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
        let err = Settings::from_toml_str("units = \"furlongs\"").unwrap_err();
        assert_eq!(err.error_code(), "SERIALIZATION_ERROR");
    }

    #[test]
    fn test_invalid_values() {
        let err = Settings::from_toml_str("history_capacity = 0").unwrap_err();
        assert_eq!(err.error_code(), "INVALID_CONFIGURATION");
    }

    #[test]
    fn test_load_missing_and_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());

        let settings = Settings {
            units: UnitSystem::Metric,
            history_capacity: 12,
            data_dir: Some(dir.path().join("data")),
            ..Settings::default()
        };
        fs::write(&path, settings.to_toml_string().unwrap()).unwrap();
        assert_eq!(Settings::load(&path).unwrap(), settings);
    }
}
