//! Integration test: train then predict through the persisted artifacts

use polars::prelude::*;
use studymetrics::config::TrainerConfig;
use studymetrics::data::{build_model_arrays, train_test_split};
use studymetrics::error::StudyMetricsError;
use studymetrics::persistence::save_object;
use studymetrics::pipeline::{CustomData, PredictPipeline};
use studymetrics::trainer::ModelTrainer;

fn student_df(n: usize) -> DataFrame {
    let genders: Vec<&str> = (0..n)
        .map(|i| if i % 2 == 0 { "female" } else { "male" })
        .collect();
    let groups: Vec<&str> = (0..n)
        .map(|i| ["group A", "group B", "group C"][i % 3])
        .collect();
    let education: Vec<&str> = (0..n)
        .map(|i| {
            [
                "bachelor's degree",
                "some college",
                "high school",
                "master's degree",
            ][i % 4]
        })
        .collect();
    let lunch: Vec<&str> = (0..n)
        .map(|i| if i % 3 == 0 { "free/reduced" } else { "standard" })
        .collect();
    let prep: Vec<&str> = (0..n)
        .map(|i| if i % 4 == 0 { "completed" } else { "none" })
        .collect();
    let reading: Vec<f64> = (0..n).map(|i| 40.0 + ((i * 7) % 55) as f64).collect();
    let writing: Vec<f64> = (0..n).map(|i| 35.0 + ((i * 11) % 60) as f64).collect();
    let math: Vec<f64> = (0..n)
        .map(|i| 0.5 * reading[i] + 0.4 * writing[i] + 5.0)
        .collect();

    df!(
        "gender" => genders,
        "race_ethnicity" => groups,
        "parental_level_of_education" => education,
        "lunch" => lunch,
        "test_preparation_course" => prep,
        "reading_score" => reading,
        "writing_score" => writing,
        "math_score" => math,
    )
    .unwrap()
}

/// Train on synthetic data and leave both artifacts in `dir`
fn train_into(dir: &std::path::Path) -> TrainerConfig {
    let config = TrainerConfig::with_artifact_dir(dir).with_cv_folds(3);

    let df = student_df(80);
    let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
    let (train_array, test_array, preprocessor) =
        build_model_arrays(&train, &test, "math_score").unwrap();

    save_object(&preprocessor, &config.artifacts.preprocessor_path()).unwrap();
    ModelTrainer::new(config.clone())
        .initiate_model_trainer(&train_array, &test_array)
        .unwrap();

    config
}

#[test]
fn test_round_trip_sample_record() {
    let dir = tempfile::tempdir().unwrap();
    let config = train_into(dir.path());

    let pipeline = PredictPipeline::load(&config.artifacts).unwrap();
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
    assert!(predictions[0].is_finite(), "got {}", predictions[0]);
}

#[test]
fn test_repeated_predictions_are_stable() {
    let dir = tempfile::tempdir().unwrap();
    let config = train_into(dir.path());

    let pipeline = PredictPipeline::load(&config.artifacts).unwrap();
    let record = CustomData::new("male", "group C", "some college", "standard", "none", 55.0, 60.0)
        .unwrap();
    let df = record.to_dataframe().unwrap();

    let first = pipeline.predict(&df).unwrap();
    let second = pipeline.predict(&df).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_unseen_category_scores_finite() {
    let dir = tempfile::tempdir().unwrap();
    let config = train_into(dir.path());

    let pipeline = PredictPipeline::load(&config.artifacts).unwrap();
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
fn test_missing_artifacts_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig::with_artifact_dir(dir.path());
    assert!(matches!(
        PredictPipeline::load(&config.artifacts),
        Err(StudyMetricsError::ArtifactMissing(_))
    ));
}

#[test]
fn test_invalid_record_names_field() {
    let err = CustomData::from_fields(
        "female",
        "group B",
        "bachelor's degree",
        "standard",
        "none",
        "72",
        "abc",
    )
    .unwrap_err();
    match err {
        StudyMetricsError::InvalidInput { field, .. } => assert_eq!(field, "writing_score"),
        other => panic!("unexpected error: {other}"),
    }
}
