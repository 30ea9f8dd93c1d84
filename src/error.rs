//! Error types for abundance table analysis.

use thiserror::Error;

/// Errors raised by table construction and the analysis routines.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    /// Unsupported method name, malformed sample groups, bad threshold or duplicate identifiers.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Non-finite value at row {row}, column {column}")]
    NonFinite { row: usize, column: usize },

    /// Numeric edge case (all-zero sample, constant row, zero reference mean) under the strict policy.
    #[error("Degenerate input: {0}")]
    DegenerateInput(String),
}

/// Result type alias for library operations.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// How numeric edge cases are handled.
///
/// `Strict` turns them into [`AnalysisError::DegenerateInput`] and aborts the whole call.
/// `Propagate` keeps IEEE float semantics (NaN or infinity in the output) and logs a warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DegeneratePolicy {
    #[default]
    Strict,
    Propagate,
}

impl DegeneratePolicy {
    /// Apply the policy to one degenerate case.
    ///
    /// Returns `Ok(())` when the caller should carry on with the propagated value.
    pub(crate) fn check(self, message: impl FnOnce() -> String) -> Result<()> {
        match self {
            DegeneratePolicy::Strict => Err(AnalysisError::DegenerateInput(message())),
            DegeneratePolicy::Propagate => {
                log::warn!("{}", message());
                Ok(())
            }
        }
    }
}
