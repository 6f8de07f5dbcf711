//! # Error Types
//!
//! Structured error types for fiber_core. Every error is serializable so a
//! front end can show a descriptive, disabled-state message instead of a
//! crash, and so JSON consumers can branch on [`FiberError::error_code`].
//!
//! ## Example
//!
//! ```rust
//! use fiber_core::errors::{FiberError, FiberResult};
//!
//! fn validate_total_rows(total_rows: u32) -> FiberResult<()> {
//!     if total_rows == 0 {
//!         return Err(FiberError::invalid_configuration("Total rows must be at least 1"));
//!     }
//!     Ok(())
//! }
//!
//! assert!(validate_total_rows(0).is_err());
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fiber_core operations
pub type FiberResult<T> = Result<T, FiberError>;

/// Structured error type for calculator, counter and storage operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum FiberError {
    /// An input value is invalid (zero gauge, impossible stitch count, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A generator or calculator was configured in a degenerate way
    #[error("Invalid configuration: {reason}")]
    InvalidConfiguration { reason: String },

    /// No tool is registered under this slug
    #[error("Unknown tool: {slug}")]
    UnknownTool { slug: String },

    /// Needle or hook size not present in the conversion table
    #[error("Unknown {system} size: {size}")]
    UnknownSize { system: String, size: String },

    /// No counter matches the given id, prefix or label
    #[error("Counter not found: {id}")]
    CounterNotFound { id: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch on a persisted record
    #[error("Version mismatch: stored version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Generic internal error (should be rare)
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl FiberError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        FiberError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an InvalidConfiguration error
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        FiberError::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Create an UnknownTool error
    pub fn unknown_tool(slug: impl Into<String>) -> Self {
        FiberError::UnknownTool { slug: slug.into() }
    }

    /// Create an UnknownSize error
    pub fn unknown_size(system: impl Into<String>, size: impl Into<String>) -> Self {
        FiberError::UnknownSize {
            system: system.into(),
            size: size.into(),
        }
    }

    /// Create a CounterNotFound error
    pub fn counter_not_found(id: impl Into<String>) -> Self {
        FiberError::CounterNotFound { id: id.into() }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        FiberError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a SerializationError
    pub fn serialization(reason: impl Into<String>) -> Self {
        FiberError::SerializationError {
            reason: reason.into(),
        }
    }

    /// Check if the user can recover by correcting their input.
    ///
    /// Storage errors are recovered by the stores themselves (fresh start),
    /// so they are not reported as user-recoverable.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            FiberError::InvalidInput { .. }
                | FiberError::InvalidConfiguration { .. }
                | FiberError::UnknownSize { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            FiberError::InvalidInput { .. } => "INVALID_INPUT",
            FiberError::InvalidConfiguration { .. } => "INVALID_CONFIGURATION",
            FiberError::UnknownTool { .. } => "UNKNOWN_TOOL",
            FiberError::UnknownSize { .. } => "UNKNOWN_SIZE",
            FiberError::CounterNotFound { .. } => "COUNTER_NOT_FOUND",
            FiberError::FileError { .. } => "FILE_ERROR",
            FiberError::SerializationError { .. } => "SERIALIZATION_ERROR",
            FiberError::VersionMismatch { .. } => "VERSION_MISMATCH",
            FiberError::Internal { .. } => "INTERNAL_ERROR",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_serialization() {
        let error = FiberError::invalid_input("stitches_per_4in", "0", "Gauge must be positive");
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("\"type\":\"InvalidInput\""));
        let roundtrip: FiberError = serde_json::from_str(&json).unwrap();
        assert_eq!(error, roundtrip);
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(FiberError::unknown_tool("loom").error_code(), "UNKNOWN_TOOL");
        assert_eq!(FiberError::counter_not_found("abc").error_code(), "COUNTER_NOT_FOUND");
        assert_eq!(
            FiberError::invalid_configuration("empty palette").error_code(),
            "INVALID_CONFIGURATION"
        );
    }

    #[test]
    fn test_recoverable() {
        assert!(FiberError::invalid_configuration("empty palette").is_recoverable());
        assert!(!FiberError::serialization("bad json").is_recoverable());
    }

    #[test]
    fn test_display_message() {
        let error = FiberError::unknown_size("US", "99");
        assert_eq!(error.to_string(), "Unknown US size: 99");
    }
}
