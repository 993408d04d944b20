//! Training entry point: evaluate the catalog, select a winner, persist it

use chrono::{DateTime, Utc};
use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::TrainerConfig;
use crate::error::{Result, StudyMetricsError};
use crate::evaluator::evaluate;
use crate::persistence::save_object;
use crate::registry::ModelRegistry;
use crate::selector::select;
use crate::training::TrainedModel;

/// The persisted model artifact: the fitted model plus its credentials
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedModel {
    /// Registry name of the winning family
    pub name: String,
    /// The fitted model
    pub model: TrainedModel,
    /// Feature-matrix width the model was fitted on
    pub n_features: usize,
    /// Held-out test R² at selection time
    pub test_r2: f64,
    /// When the artifact was produced
    pub trained_at: DateTime<Utc>,
}

/// Orchestrates evaluation, selection, and persistence of the winner.
pub struct ModelTrainer {
    config: TrainerConfig,
    registry: ModelRegistry,
}

impl ModelTrainer {
    pub fn new(config: TrainerConfig) -> Self {
        Self {
            config,
            registry: ModelRegistry::standard(),
        }
    }

    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Run the full training pass.
    ///
    /// Both arrays carry the target as their last column. The winner is
    /// persisted atomically at the configured model path; nothing is written
    /// when selection fails. Returns the winner's test R².
    pub fn initiate_model_trainer(
        &self,
        train_array: &Array2<f64>,
        test_array: &Array2<f64>,
    ) -> Result<f64> {
        let (x_train, y_train) = split_target(train_array)?;
        let (x_test, y_test) = split_target(test_array)?;

        if x_train.ncols() != x_test.ncols() {
            return Err(StudyMetricsError::SchemaMismatch {
                expected: x_train.ncols(),
                actual: x_test.ncols(),
            });
        }

        info!(
            train_rows = x_train.nrows(),
            test_rows = x_test.nrows(),
            features = x_train.ncols(),
            "training run started"
        );

        let evaluated = evaluate(
            &x_train,
            &y_train,
            &x_test,
            &y_test,
            &self.registry,
            self.config.cv_folds,
            self.config.random_seed,
        )?;

        let selection = select(evaluated, self.config.quality_floor)?;

        let saved = SavedModel {
            name: selection.name,
            model: selection.model,
            n_features: x_train.ncols(),
            test_r2: selection.test_r2,
            trained_at: Utc::now(),
        };
        save_object(&saved, &self.config.artifacts.model_path())?;

        Ok(saved.test_r2)
    }
}

/// Split the last column off as the target
fn split_target(array: &Array2<f64>) -> Result<(Array2<f64>, Array1<f64>)> {
    if array.ncols() < 2 {
        return Err(StudyMetricsError::DataError(format!(
            "expected at least one feature column plus a target, got {} columns",
            array.ncols()
        )));
    }
    if array.nrows() == 0 {
        return Err(StudyMetricsError::DataError(
            "empty training array".to_string(),
        ));
    }

    let n_cols = array.ncols();
    let x = array.slice(s![.., ..n_cols - 1]).to_owned();
    let y = array.column(n_cols - 1).to_owned();
    Ok((x, y))
}
