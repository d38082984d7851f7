//! Configuration error types.
//!
//! Gameplay itself never fails: out-of-range commands are silently ignored.
//! Loading or validating a [`crate::Tuning`] is the only fallible surface.

use std::fmt;

/// Error raised while loading or validating tuning values.
#[derive(Debug)]
pub enum TuningError {
    /// The JSON document could not be parsed.
    Parse(serde_json::Error),

    /// A tuning value is outside the range the simulation can work with.
    OutOfRange {
        /// Name of the field (for logging).
        name: &'static str,
        /// The value that was rejected.
        value: f32,
        /// Human-readable description of the accepted range.
        expected: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(e) => write!(f, "failed to parse tuning JSON: {}", e),
            TuningError::OutOfRange {
                name,
                value,
                expected,
            } => write!(
                f,
                "tuning value '{}' = {} is out of range (expected {})",
                name, value, expected
            ),
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(e) => Some(e),
            TuningError::OutOfRange { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(e: serde_json::Error) -> Self {
        TuningError::Parse(e)
    }
}
