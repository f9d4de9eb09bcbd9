//! Error types for the anofox-x11 library.

use thiserror::Error;

/// Result type alias for decomposition operations.
pub type Result<T> = std::result::Result<T, X11Error>;

/// Input rejected before any filtering step runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Series shorter than three full annual cycles.
    #[error("series too short: need at least {needed} observations, got {got}")]
    TooShort { needed: usize, got: usize },

    /// NaN or infinite observation.
    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    /// Zero or negative observation under a multiplicative or log-additive mode.
    #[error("non-positive value {value} at index {index} is not allowed in this mode")]
    NonPositive { index: usize, value: f64 },

    /// Annual frequency that X-11 filters are not defined for.
    #[error("unsupported annual frequency: {0} (expected 2, 3, 4, 6 or 12)")]
    UnsupportedPeriod(usize),

    /// Invalid configuration value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Errors that can occur during X-11 decomposition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum X11Error {
    /// Input validation failed.
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    /// A divisor or scale collapsed to zero where it cannot be floored.
    #[error("numerical degeneracy: {0}")]
    NumericalDegeneracy(String),

    /// Dimension mismatch between two series.
    #[error("dimension mismatch: expected {expected}, got {got}")]
    DimensionMismatch { expected: usize, got: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = X11Error::from(ValidationError::TooShort { needed: 36, got: 20 });
        assert_eq!(
            err.to_string(),
            "validation error: series too short: need at least 36 observations, got 20"
        );

        let err = ValidationError::NonFinite { index: 3 };
        assert_eq!(err.to_string(), "non-finite value at index 3");

        let err = ValidationError::NonPositive {
            index: 7,
            value: -1.5,
        };
        assert_eq!(
            err.to_string(),
            "non-positive value -1.5 at index 7 is not allowed in this mode"
        );

        let err = X11Error::NumericalDegeneracy("zero normalizer".to_string());
        assert_eq!(err.to_string(), "numerical degeneracy: zero normalizer");

        let err = X11Error::DimensionMismatch {
            expected: 3,
            got: 2,
        };
        assert_eq!(err.to_string(), "dimension mismatch: expected 3, got 2");
    }

    #[test]
    fn errors_are_clonable_and_comparable() {
        let err1 = X11Error::from(ValidationError::UnsupportedPeriod(5));
        let err2 = err1.clone();
        assert_eq!(err1, err2);
    }
}
