//! Fitted preprocessing pipeline: scaling + encoding with a recorded layout

use super::{ColumnType, OneHotEncoder, Scaler};
use crate::error::{Result, StudyMetricsError};
use ndarray::Array2;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// The full feature transformer fitted on training data.
///
/// Column roles are detected from dtypes at fit time. Numeric columns are
/// standard-scaled, categorical columns one-hot encoded, and the resulting
/// output column order is recorded so every later transform produces the
/// exact same feature layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataPreprocessor {
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: Option<Scaler>,
    encoder: Option<OneHotEncoder>,
    output_columns: Vec<String>,
    is_fitted: bool,
}

impl DataPreprocessor {
    pub fn new() -> Self {
        Self {
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            scaler: None,
            encoder: None,
            output_columns: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the transformer: detect column roles, fit the scaler and encoder,
    /// and record the output layout.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        let df = cast_numeric_to_f64(df)?;

        self.detect_column_types(&df)?;

        if !self.numeric_columns.is_empty() {
            let cols: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
            let mut scaler = Scaler::new();
            scaler.fit(&df, &cols)?;
            self.scaler = Some(scaler);
        }

        if !self.categorical_columns.is_empty() {
            let cols: Vec<&str> = self
                .categorical_columns
                .iter()
                .map(|s| s.as_str())
                .collect();
            let mut encoder = OneHotEncoder::new();
            encoder.fit(&df, &cols)?;
            self.encoder = Some(encoder);
        }

        self.output_columns = self.numeric_columns.clone();
        if let Some(ref encoder) = self.encoder {
            self.output_columns.extend(encoder.output_columns());
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform a frame into the recorded feature layout
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(StudyMetricsError::ModelNotFitted);
        }

        let mut result = cast_numeric_to_f64(df)?;

        if let Some(ref scaler) = self.scaler {
            result = scaler.transform(&result)?;
        }

        if let Some(ref encoder) = self.encoder {
            result = encoder.transform(&result)?;
        }

        // Re-select to pin the fitted column order
        result
            .select(self.output_columns.iter().map(String::as_str))
            .map_err(|e| StudyMetricsError::DataError(e.to_string()))
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame) -> Result<DataFrame> {
        self.fit(df)?;
        self.transform(df)
    }

    /// Transform straight into a dense feature matrix
    pub fn transform_array(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let transformed = self.transform(df)?;
        dataframe_to_array2(&transformed)
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    /// Output column names in transform order
    pub fn output_columns(&self) -> &[String] {
        &self.output_columns
    }

    /// Width of the transformed feature matrix
    pub fn n_features(&self) -> usize {
        self.output_columns.len()
    }

    fn detect_column_types(&mut self, df: &DataFrame) -> Result<()> {
        self.numeric_columns.clear();
        self.categorical_columns.clear();

        for col in df.get_columns() {
            let name = col.name().to_string();
            match column_type(col.dtype()) {
                Some(ColumnType::Numeric) => self.numeric_columns.push(name),
                Some(ColumnType::Categorical) => self.categorical_columns.push(name),
                None => {
                    return Err(StudyMetricsError::DataError(format!(
                        "unsupported column dtype: {} ({})",
                        name,
                        col.dtype()
                    )))
                }
            }
        }

        Ok(())
    }
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

fn column_type(dtype: &DataType) -> Option<ColumnType> {
    match dtype {
        DataType::Float64 => Some(ColumnType::Numeric),
        DataType::String => Some(ColumnType::Categorical),
        _ => None,
    }
}

/// Cast all numeric columns to Float64 for consistent processing
fn cast_numeric_to_f64(df: &DataFrame) -> Result<DataFrame> {
    let mut result = df.clone();
    for col in df.get_columns() {
        match col.dtype() {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32 => {
                let casted = col
                    .cast(&DataType::Float64)
                    .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
                result = result
                    .with_column(casted)
                    .map_err(|e| StudyMetricsError::DataError(e.to_string()))?
                    .clone();
            }
            _ => {}
        }
    }
    Ok(result)
}

/// Convert an all-Float64 frame into a row-major matrix
pub fn dataframe_to_array2(df: &DataFrame) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = df.width();
    let mut data = Vec::with_capacity(n_rows * n_cols);

    let columns: Vec<&Float64Chunked> = df
        .get_columns()
        .iter()
        .map(|col| {
            col.as_materialized_series()
                .f64()
                .map_err(|e| StudyMetricsError::DataError(e.to_string()))
        })
        .collect::<Result<Vec<_>>>()?;

    for row in 0..n_rows {
        for ca in &columns {
            data.push(ca.get(row).ok_or_else(|| {
                StudyMetricsError::DataError(format!("null value at row {row}"))
            })?);
        }
    }

    Array2::from_shape_vec((n_rows, n_cols), data)
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))
}
