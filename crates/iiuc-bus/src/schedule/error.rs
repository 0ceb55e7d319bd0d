//! Error types for loading schedule data.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DatasetError {
    /// The dataset file could not be read
    #[error("Failed to read schedule file {path}: {message}")]
    Io { path: String, message: String },

    /// The dataset is not a valid JSON array of schedule records
    #[error("Invalid schedule data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two records share the same id
    #[error("Duplicate schedule id: {id}")]
    DuplicateId { id: String },
}
