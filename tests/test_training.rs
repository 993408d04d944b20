//! Integration test: training pipeline end-to-end

use polars::prelude::*;
use studymetrics::config::TrainerConfig;
use studymetrics::data::{build_model_arrays, train_test_split};
use studymetrics::error::StudyMetricsError;
use studymetrics::persistence::load_object;
use studymetrics::registry::ModelRegistry;
use studymetrics::trainer::{ModelTrainer, SavedModel};

/// Synthetic student records with a learnable linear signal in the target
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
        .map(|i| {
            let prep_bonus = if i % 4 == 0 { 4.0 } else { 0.0 };
            0.5 * reading[i] + 0.4 * writing[i] + prep_bonus + 5.0
        })
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

#[test]
fn test_registry_catalog() {
    let registry = ModelRegistry::standard();
    let names: Vec<&str> = registry.entries().iter().map(|e| e.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "Random Forest",
            "Decision Tree",
            "Gradient Boosting",
            "Linear Regression",
            "XGBRegressor",
            "AdaBoost Regressor",
        ]
    );
}

#[test]
fn test_full_training_run_persists_winner() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig::with_artifact_dir(dir.path()).with_cv_folds(3);

    let df = student_df(80);
    let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
    let (train_array, test_array, preprocessor) =
        build_model_arrays(&train, &test, "math_score").unwrap();
    assert_eq!(train_array.ncols(), preprocessor.n_features() + 1);

    let trainer = ModelTrainer::new(config);
    let test_r2 = trainer
        .initiate_model_trainer(&train_array, &test_array)
        .unwrap();
    assert!(test_r2 > 0.6, "test R² = {test_r2}");

    let saved: SavedModel = load_object(&trainer.config().artifacts.model_path()).unwrap();
    assert_eq!(saved.n_features, preprocessor.n_features());
    assert!((saved.test_r2 - test_r2).abs() < 1e-12);
}

#[test]
fn test_unreachable_floor_persists_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let config = TrainerConfig::with_artifact_dir(dir.path())
        .with_cv_folds(3)
        .with_quality_floor(1.1);

    let df = student_df(60);
    let (train, test) = train_test_split(&df, 0.2, 42).unwrap();
    let (train_array, test_array, _) = build_model_arrays(&train, &test, "math_score").unwrap();

    let trainer = ModelTrainer::new(config);
    let err = trainer
        .initiate_model_trainer(&train_array, &test_array)
        .unwrap_err();
    assert!(matches!(err, StudyMetricsError::NoAcceptableModel { .. }));
    assert!(!trainer.config().artifacts.model_path().exists());
}

#[test]
fn test_training_is_deterministic() {
    let df = student_df(60);
    let (train, test) = train_test_split(&df, 0.2, 7).unwrap();
    let (train_array, test_array, _) = build_model_arrays(&train, &test, "math_score").unwrap();

    let run = |dir: &std::path::Path| {
        let config = TrainerConfig::with_artifact_dir(dir).with_cv_folds(3);
        ModelTrainer::new(config)
            .initiate_model_trainer(&train_array, &test_array)
            .unwrap()
    };

    let dir_a = tempfile::tempdir().unwrap();
    let dir_b = tempfile::tempdir().unwrap();
    assert_eq!(run(dir_a.path()), run(dir_b.path()));
}
