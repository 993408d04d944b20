//! StudyMetrics - Student performance score prediction
//!
//! An offline training/selection pipeline and an online inference pipeline
//! for predicting a student's numeric performance score from demographic and
//! academic inputs.
//!
//! # Modules
//!
//! ## Training pipeline
//! - [`registry`] - The closed catalog of candidate regressors and their grids
//! - [`training`] - Native model implementations, K-fold CV, metrics
//! - [`evaluator`] - Grid search + cross-validated scoring per family
//! - [`selector`] - Winner selection with the quality floor
//! - [`trainer`] - The training entry point and `SavedModel` artifact
//!
//! ## Inference pipeline
//! - [`pipeline`] - Record validation and prediction over persisted artifacts
//!
//! ## Data handling
//! - [`data`] - CSV ingestion, seeded train/test split, array assembly
//! - [`preprocessing`] - Scaling + one-hot encoding with a recorded layout
//! - [`persistence`] - Atomic JSON artifact save/load
//!
//! ## Infrastructure
//! - [`config`] - Trainer and artifact configuration
//! - [`error`] - The crate error type

pub mod config;
pub mod data;
pub mod error;
pub mod evaluator;
pub mod persistence;
pub mod pipeline;
pub mod preprocessing;
pub mod registry;
pub mod selector;
pub mod trainer;
pub mod training;

pub use error::{Result, StudyMetricsError};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::{ArtifactConfig, TrainerConfig};
    pub use crate::error::{Result, StudyMetricsError};
    pub use crate::evaluator::{evaluate, EvaluationReport, ModelScore};
    pub use crate::pipeline::{CustomData, PredictPipeline};
    pub use crate::preprocessing::DataPreprocessor;
    pub use crate::registry::{CandidateParams, ModelRegistry};
    pub use crate::selector::{select, Selection};
    pub use crate::trainer::{ModelTrainer, SavedModel};
    pub use crate::training::{fit_candidate, TrainedModel};
}
