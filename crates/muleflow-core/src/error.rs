//! Error types for MuleFlow.

use thiserror::Error;

/// Result type alias using `AnalysisError`.
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can occur during an analysis invocation.
///
/// The caller-facing surface has three categories (`invalid_input`,
/// `empty_input`, `internal_error`); `category` maps variants onto it.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// Malformed input: bad record stream or unusable field values.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No valid transactions remained after validation.
    #[error("empty input: {0}")]
    EmptyInput(String),

    /// Configuration rejected by validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal invariant violation. Indicates a bug, not bad input.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AnalysisError {
    /// Create an invalid-input error.
    #[must_use]
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AnalysisError::InvalidInput(msg.into())
    }

    /// Create an empty-input error.
    #[must_use]
    pub fn empty_input(msg: impl Into<String>) -> Self {
        AnalysisError::EmptyInput(msg.into())
    }

    /// Create a configuration error.
    #[must_use]
    pub fn config(msg: impl Into<String>) -> Self {
        AnalysisError::Config(msg.into())
    }

    /// Create an internal error.
    #[must_use]
    pub fn internal(msg: impl Into<String>) -> Self {
        AnalysisError::Internal(msg.into())
    }

    /// The caller-facing error category.
    #[must_use]
    pub fn category(&self) -> &'static str {
        match self {
            AnalysisError::InvalidInput(_) | AnalysisError::Config(_) => "invalid_input",
            AnalysisError::EmptyInput(_) => "empty_input",
            AnalysisError::Internal(_) => "internal_error",
        }
    }

    /// Returns true if the error is attributable to the caller's input.
    #[must_use]
    pub fn is_caller_error(&self) -> bool {
        !matches!(self, AnalysisError::Internal(_))
    }
}
