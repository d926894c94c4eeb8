//! Error types for storm selection and table operations.

use thiserror::Error;

/// Result type alias using StormError.
pub type StormResult<T> = Result<T, StormError>;

#[derive(Debug, Error)]
pub enum StormError {
    #[error("No category code for storm: {0}")]
    UnknownStorm(String),

    #[error("Invalid storm selection: {0}")]
    InvalidSelection(String),

    #[error("Failed to serialize table: {0}")]
    Serialization(#[from] serde_json::Error),
}
