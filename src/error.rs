//! Error types for the retrieval pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for retrieval and evaluation operations
pub type Result<T> = std::result::Result<T, CbirError>;

/// Error types that can occur while extracting, indexing, searching or evaluating
#[derive(Error, Debug)]
pub enum CbirError {
    #[error("Not found: {what}")]
    NotFound { what: String },

    #[error("Invalid image {image}: {reason}")]
    InvalidImage { image: String, reason: String },

    #[error("Corrupt index {} (line {line}): {reason}", path.display())]
    CorruptIndex {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("Degenerate class {name}: it has no members, recall is undefined")]
    DegenerateClass { name: String },

    #[error("Curve length mismatch: expected {expected}, got {actual}")]
    CurveLengthMismatch { expected: usize, actual: usize },

    #[error("Dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CbirError {
    pub(crate) fn not_found(what: impl Into<String>) -> Self {
        CbirError::NotFound { what: what.into() }
    }

    pub(crate) fn invalid_image(image: impl Into<String>, reason: impl Into<String>) -> Self {
        CbirError::InvalidImage {
            image: image.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn corrupt(path: impl Into<PathBuf>, line: usize, reason: impl Into<String>) -> Self {
        CbirError::CorruptIndex {
            path: path.into(),
            line,
            reason: reason.into(),
        }
    }
}
