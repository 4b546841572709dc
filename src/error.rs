//! Error types for the house price pipeline

use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, KolosalError>;

/// Main error type for the pipeline
#[derive(Error, Debug)]
pub enum KolosalError {
    #[error("Dataset not registered: {0}")]
    Lookup(String),

    #[error("Integrity check failed for {name}: expected {expected}, got {actual}")]
    Integrity {
        name: String,
        expected: String,
        actual: String,
    },

    #[error("Unsupported archive format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Download error: {0}")]
    Download(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Archive error: {0}")]
    ArchiveError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Feature not found: {0}")]
    FeatureNotFound(String),
}

impl From<polars::error::PolarsError> for KolosalError {
    fn from(err: polars::error::PolarsError) -> Self {
        KolosalError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for KolosalError {
    fn from(err: serde_json::Error) -> Self {
        KolosalError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for KolosalError {
    fn from(err: ndarray::ShapeError) -> Self {
        KolosalError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for KolosalError {
    fn from(err: reqwest::Error) -> Self {
        KolosalError::Download(err.to_string())
    }
}

impl From<zip::result::ZipError> for KolosalError {
    fn from(err: zip::result::ZipError) -> Self {
        KolosalError::ArchiveError(err.to_string())
    }
}
