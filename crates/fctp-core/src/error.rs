//! Unified error types for the FCTP workspace
//!
//! [`FctpError`] covers everything that can go wrong before a decomposition
//! run starts: reading configuration files, parsing them, and validating the
//! instance data. Solver-side failures live in `fctp-algo`.
//!
//! # Example
//!
//! ```
//! use fctp_core::{FctpError, FctpResult};
//!
//! fn check_capacity(value: f64) -> FctpResult<f64> {
//!     if value < 0.0 {
//!         return Err(FctpError::validation("capacities.i1", "must be non-negative"));
//!     }
//!     Ok(value)
//! }
//!
//! assert!(check_capacity(-1.0).is_err());
//! ```

use thiserror::Error;

/// Unified error type for data loading and validation.
#[derive(Error, Debug)]
pub enum FctpError {
    /// I/O errors (file access)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing/deserialization errors
    #[error("Parse error: {0}")]
    Parse(String),

    /// Instance data validation errors, naming the offending field
    #[error("Validation error in '{field}': {message}")]
    Validation { field: String, message: String },

    /// Run option errors (iteration budget, tolerance, penalty)
    #[error("Configuration error: {0}")]
    Config(String),
}

impl FctpError {
    /// Build a [`FctpError::Validation`] for `field`.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        FctpError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Name of the offending field, if this is a validation error.
    pub fn field(&self) -> Option<&str> {
        match self {
            FctpError::Validation { field, .. } => Some(field),
            _ => None,
        }
    }
}

/// Convenience type alias for Results using FctpError.
pub type FctpResult<T> = Result<T, FctpError>;

impl From<serde_json::Error> for FctpError {
    fn from(err: serde_json::Error) -> Self {
        FctpError::Parse(err.to_string())
    }
}

impl From<serde_yaml::Error> for FctpError {
    fn from(err: serde_yaml::Error) -> Self {
        FctpError::Parse(err.to_string())
    }
}
