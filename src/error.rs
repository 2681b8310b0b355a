//! Error types for tally.

use thiserror::Error;

/// Result type for tally operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for tally operations.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// An outcome record could not be parsed or interpreted (wrong field
    /// count, non-numeric score, bad class value). The message identifies
    /// the offending line or record.
    #[error("Malformed record: {0}")]
    MalformedRecord(String),

    /// The learning-mode string from external configuration is not one of
    /// the recognized modes.
    #[error("Invalid learning mode: {0:?} (expected singleLabel, multiLabel, or regression)")]
    InvalidLearningMode(String),

    /// Predicted/gold vectors disagree in length, within one record or
    /// across the records of a run.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
}

impl Error {
    /// Create a malformed-record error.
    pub fn malformed_record(msg: impl Into<String>) -> Self {
        Error::MalformedRecord(msg.into())
    }

    /// Create a malformed-record error attributed to a 1-based source line.
    pub fn malformed_line(line_no: usize, msg: impl Into<String>) -> Self {
        Error::MalformedRecord(format!("line {line_no}: {}", msg.into()))
    }

    /// Create an invalid learning mode error.
    pub fn invalid_learning_mode(mode: impl Into<String>) -> Self {
        Error::InvalidLearningMode(mode.into())
    }

    /// Create a shape mismatch error.
    pub fn shape_mismatch(msg: impl Into<String>) -> Self {
        Error::ShapeMismatch(msg.into())
    }
}
