//! Data ingestion: CSV loading, train/test split, feature-array assembly

use ndarray::Array2;
use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fs::File;
use std::path::Path;
use tracing::info;

use crate::error::{Result, StudyMetricsError};
use crate::preprocessing::DataPreprocessor;

/// Read a CSV file with a header row
pub fn load_csv(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .map_err(|e| StudyMetricsError::DataError(format!("{}: {e}", path.display())))?;

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(100))
        .into_reader_with_file_handle(file)
        .finish()
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

    info!(path = %path.display(), rows = df.height(), cols = df.width(), "dataset loaded");
    Ok(df)
}

/// Shuffle rows with a seeded RNG and split off a test fraction
pub fn train_test_split(
    df: &DataFrame,
    test_fraction: f64,
    seed: u64,
) -> Result<(DataFrame, DataFrame)> {
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(StudyMetricsError::DataError(format!(
            "test fraction must be in (0, 1), got {test_fraction}"
        )));
    }

    let n = df.height();
    let n_test = ((n as f64) * test_fraction).round() as usize;
    if n_test == 0 || n_test >= n {
        return Err(StudyMetricsError::DataError(format!(
            "dataset of {n} rows cannot be split with test fraction {test_fraction}"
        )));
    }

    let mut indices: Vec<u32> = (0..n as u32).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let test_idx = IdxCa::from_vec("idx".into(), indices[..n_test].to_vec());
    let train_idx = IdxCa::from_vec("idx".into(), indices[n_test..].to_vec());

    let test = df
        .take(&test_idx)
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
    let train = df
        .take(&train_idx)
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

    Ok((train, test))
}

/// Fit the transformer on the training features and assemble the model
/// arrays, target appended as the last column of each.
pub fn build_model_arrays(
    train: &DataFrame,
    test: &DataFrame,
    target: &str,
) -> Result<(Array2<f64>, Array2<f64>, DataPreprocessor)> {
    let mut preprocessor = DataPreprocessor::new();
    let x_train = {
        let features = drop_target(train, target)?;
        preprocessor.fit(&features)?;
        preprocessor.transform_array(&features)?
    };
    let x_test = preprocessor.transform_array(&drop_target(test, target)?)?;

    let y_train = target_values(train, target)?;
    let y_test = target_values(test, target)?;

    Ok((
        append_target(&x_train, &y_train)?,
        append_target(&x_test, &y_test)?,
        preprocessor,
    ))
}

fn drop_target(df: &DataFrame, target: &str) -> Result<DataFrame> {
    df.drop(target)
        .map_err(|_| StudyMetricsError::DataError(format!("target column not found: {target}")))
}

fn target_values(df: &DataFrame, target: &str) -> Result<Vec<f64>> {
    let series = df
        .column(target)
        .map_err(|_| StudyMetricsError::DataError(format!("target column not found: {target}")))?
        .as_materialized_series()
        .cast(&DataType::Float64)
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

    let ca = series
        .f64()
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
    ca.into_iter()
        .enumerate()
        .map(|(i, opt)| {
            opt.ok_or_else(|| {
                StudyMetricsError::DataError(format!("null target value at row {i}"))
            })
        })
        .collect()
}

fn append_target(features: &Array2<f64>, target: &[f64]) -> Result<Array2<f64>> {
    if features.nrows() != target.len() {
        return Err(StudyMetricsError::DataError(format!(
            "feature rows ({}) do not match target length ({})",
            features.nrows(),
            target.len()
        )));
    }

    let mut combined = Array2::zeros((features.nrows(), features.ncols() + 1));
    combined
        .slice_mut(ndarray::s![.., ..features.ncols()])
        .assign(features);
    for (i, &value) in target.iter().enumerate() {
        combined[[i, features.ncols()]] = value;
    }
    Ok(combined)
}
