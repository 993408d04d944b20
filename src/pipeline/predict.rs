//! Inference over persisted artifacts

use ndarray::Array1;
use polars::prelude::DataFrame;
use tracing::info;

use crate::config::ArtifactConfig;
use crate::error::{Result, StudyMetricsError};
use crate::persistence::load_object;
use crate::preprocessing::DataPreprocessor;
use crate::trainer::SavedModel;

/// Loaded transformer + model pair.
///
/// Read-only with respect to the artifacts; one loaded pipeline can serve
/// any number of predict calls.
pub struct PredictPipeline {
    preprocessor: DataPreprocessor,
    saved: SavedModel,
}

impl PredictPipeline {
    /// Load both artifacts from the configured paths
    pub fn load(artifacts: &ArtifactConfig) -> Result<Self> {
        let preprocessor: DataPreprocessor = load_object(&artifacts.preprocessor_path())?;
        let saved: SavedModel = load_object(&artifacts.model_path())?;

        info!(
            model = %saved.name,
            test_r2 = saved.test_r2,
            n_features = saved.n_features,
            "prediction pipeline loaded"
        );

        Ok(Self {
            preprocessor,
            saved,
        })
    }

    /// Name of the loaded model family
    pub fn model_name(&self) -> &str {
        &self.saved.name
    }

    /// Transform raw records and score them
    pub fn predict(&self, df: &DataFrame) -> Result<Array1<f64>> {
        let features = self.preprocessor.transform_array(df)?;

        if features.ncols() != self.saved.n_features {
            return Err(StudyMetricsError::SchemaMismatch {
                expected: self.saved.n_features,
                actual: features.ncols(),
            });
        }

        self.saved.model.predict(&features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::save_object;
    use crate::pipeline::CustomData;
    use crate::training::{LinearRegression, TrainedModel};
    use chrono::Utc;
    use polars::prelude::*;

    fn training_frame() -> DataFrame {
        DataFrame::new(vec![
            Series::new("gender".into(), &["female", "male", "female", "male"]).into(),
            Series::new(
                "race_ethnicity".into(),
                &["group B", "group C", "group B", "group A"],
            )
            .into(),
            Series::new(
                "parental_level_of_education".into(),
                &[
                    "bachelor's degree",
                    "some college",
                    "master's degree",
                    "high school",
                ],
            )
            .into(),
            Series::new(
                "lunch".into(),
                &["standard", "free/reduced", "standard", "standard"],
            )
            .into(),
            Series::new(
                "test_preparation_course".into(),
                &["none", "completed", "none", "none"],
            )
            .into(),
            Series::new("reading_score".into(), &[72.0, 69.0, 90.0, 47.0]).into(),
            Series::new("writing_score".into(), &[74.0, 55.0, 93.0, 44.0]).into(),
        ])
        .unwrap()
    }

    fn write_artifacts(dir: &std::path::Path) -> ArtifactConfig {
        let artifacts = ArtifactConfig::in_dir(dir);

        let mut preprocessor = DataPreprocessor::new();
        let features = {
            preprocessor.fit(&training_frame()).unwrap();
            preprocessor.transform_array(&training_frame()).unwrap()
        };

        let y = ndarray::array![76.0, 60.0, 95.0, 45.0];
        let mut model = LinearRegression::new();
        model.fit(&features, &y).unwrap();

        let saved = SavedModel {
            name: "Linear Regression".to_string(),
            model: TrainedModel::LinearRegression(model),
            n_features: features.ncols(),
            test_r2: 0.9,
            trained_at: Utc::now(),
        };

        save_object(&preprocessor, &artifacts.preprocessor_path()).unwrap();
        save_object(&saved, &artifacts.model_path()).unwrap();
        artifacts
    }

    #[test]
    fn test_predict_single_record() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_artifacts(dir.path());

        let pipeline = PredictPipeline::load(&artifacts).unwrap();
        let record = CustomData::new(
            "female",
            "group B",
            "bachelor's degree",
            "standard",
            "none",
            72.0,
            74.0,
        )
        .unwrap();

        let predictions = pipeline.predict(&record.to_dataframe().unwrap()).unwrap();
        assert_eq!(predictions.len(), 1);
        assert!(predictions[0].is_finite());
    }

    #[test]
    fn test_unseen_category_still_scores() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = write_artifacts(dir.path());
        let pipeline = PredictPipeline::load(&artifacts).unwrap();

        let record = CustomData::new(
            "female",
            "group Z",
            "bachelor's degree",
            "standard",
            "none",
            60.0,
            60.0,
        )
        .unwrap();

        let predictions = pipeline.predict(&record.to_dataframe().unwrap()).unwrap();
        assert!(predictions[0].is_finite());
    }

    #[test]
    fn test_missing_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let artifacts = ArtifactConfig::in_dir(dir.path());
        assert!(matches!(
            PredictPipeline::load(&artifacts),
            Err(StudyMetricsError::ArtifactMissing(_))
        ));
    }
}
