//! Configuration for training runs and artifact layout

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Where persisted artifacts live: one transformer blob, one model blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArtifactConfig {
    /// Directory holding all artifacts
    pub dir: PathBuf,
    /// File name of the serialized model
    pub model_file: String,
    /// File name of the serialized preprocessor
    pub preprocessor_file: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("artifacts"),
            model_file: "model.json".to_string(),
            preprocessor_file: "preprocessor.json".to_string(),
        }
    }
}

impl ArtifactConfig {
    /// Create a config rooted at the given directory with default file names
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            ..Default::default()
        }
    }

    /// Full path to the model blob
    pub fn model_path(&self) -> PathBuf {
        self.dir.join(&self.model_file)
    }

    /// Full path to the preprocessor blob
    pub fn preprocessor_path(&self) -> PathBuf {
        self.dir.join(&self.preprocessor_file)
    }
}

/// Configuration for a training/selection run.
///
/// Defaults preserve the service's deployment constants: a model is only
/// accepted if its held-out R² reaches 0.6.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Artifact layout
    pub artifacts: ArtifactConfig,
    /// Minimum acceptable test R²; below this nothing is persisted
    pub quality_floor: f64,
    /// Number of cross-validation folds used during grid search
    pub cv_folds: usize,
    /// Seed threaded through every stochastic model fit
    pub random_seed: u64,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            artifacts: ArtifactConfig::default(),
            quality_floor: 0.6,
            cv_folds: 5,
            random_seed: 42,
        }
    }
}

impl TrainerConfig {
    /// Create a config with artifacts rooted at the given directory
    pub fn with_artifact_dir(dir: impl AsRef<Path>) -> Self {
        Self {
            artifacts: ArtifactConfig::in_dir(dir),
            ..Default::default()
        }
    }

    /// Set the quality floor
    pub fn with_quality_floor(mut self, floor: f64) -> Self {
        self.quality_floor = floor;
        self
    }

    /// Set the number of CV folds
    pub fn with_cv_folds(mut self, folds: usize) -> Self {
        self.cv_folds = folds;
        self
    }

    /// Set the random seed
    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_paths() {
        let config = ArtifactConfig::default();
        assert_eq!(config.model_path(), PathBuf::from("artifacts/model.json"));
        assert_eq!(
            config.preprocessor_path(),
            PathBuf::from("artifacts/preprocessor.json")
        );
    }

    #[test]
    fn test_trainer_defaults() {
        let config = TrainerConfig::default();
        assert_eq!(config.quality_floor, 0.6);
        assert_eq!(config.cv_folds, 5);
        assert_eq!(config.random_seed, 42);
    }

    #[test]
    fn test_builder() {
        let config = TrainerConfig::with_artifact_dir("/tmp/art")
            .with_quality_floor(0.8)
            .with_cv_folds(3)
            .with_random_seed(7);
        assert_eq!(config.artifacts.dir, PathBuf::from("/tmp/art"));
        assert_eq!(config.quality_floor, 0.8);
        assert_eq!(config.cv_folds, 3);
        assert_eq!(config.random_seed, 7);
    }
}
