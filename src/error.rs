//! Error types for the StudyMetrics prediction service

use thiserror::Error;

/// Result type alias for StudyMetrics operations
pub type Result<T> = std::result::Result<T, StudyMetricsError>;

/// Main error type for the StudyMetrics service
#[derive(Error, Debug)]
pub enum StudyMetricsError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Fit failure for model '{model}': {reason}")]
    FitFailure { model: String, reason: String },

    #[error(
        "No acceptable model: best candidate '{best_model}' scored {best_score:.4}, \
         below quality floor {floor:.4}"
    )]
    NoAcceptableModel {
        best_model: String,
        best_score: f64,
        floor: f64,
    },

    #[error("Artifact missing: {0} (has a training run completed?)")]
    ArtifactMissing(String),

    #[error("Schema mismatch: expected {expected} features, got {actual}")]
    SchemaMismatch { expected: usize, actual: usize },

    #[error("Invalid input for field '{field}': {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),
}

impl From<polars::error::PolarsError> for StudyMetricsError {
    fn from(err: polars::error::PolarsError) -> Self {
        StudyMetricsError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for StudyMetricsError {
    fn from(err: serde_json::Error) -> Self {
        StudyMetricsError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for StudyMetricsError {
    fn from(err: ndarray::ShapeError) -> Self {
        StudyMetricsError::DataError(err.to_string())
    }
}
