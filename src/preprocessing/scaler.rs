//! Standard scaling for numeric feature columns

use crate::error::{Result, StudyMetricsError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters for one fitted column: z-score center and scale
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ScalerParams {
    mean: f64,
    std: f64,
}

/// Z-score scaler: (x - mean) / std per column
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    params: HashMap<String, ScalerParams>,
    is_fitted: bool,
}

impl Scaler {
    pub fn new() -> Self {
        Self {
            params: HashMap::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the named columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        for col_name in columns {
            let column = df.column(col_name).map_err(|_| {
                StudyMetricsError::DataError(format!("column not found: {col_name}"))
            })?;
            let series = column.as_materialized_series();

            let params = compute_params(series)?;
            self.params.insert(col_name.to_string(), params);
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Transform the data.
    /// Builds all replacement columns first, then applies them in a single pass
    /// (avoids N DataFrame clones for N columns).
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(StudyMetricsError::ModelNotFitted);
        }

        let replacements: Vec<Series> = self
            .params
            .iter()
            .filter_map(|(col_name, params)| {
                df.column(col_name).ok().map(|column| {
                    let series = column.as_materialized_series();
                    scale_series(series, params)
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let mut result = df.clone();
        for scaled in replacements {
            result = result
                .with_column(scaled)
                .map_err(|e| StudyMetricsError::DataError(e.to_string()))?
                .clone();
        }

        Ok(result)
    }

    /// Fit and transform in one step
    pub fn fit_transform(&mut self, df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
        self.fit(df, columns)?;
        self.transform(df)
    }
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

fn compute_params(series: &Series) -> Result<ScalerParams> {
    let ca = series
        .f64()
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

    let mean = ca.mean().unwrap_or(0.0);
    let std = ca.std(1).unwrap_or(1.0);
    Ok(ScalerParams {
        mean,
        // Constant column scales to zero, not NaN
        std: if std == 0.0 { 1.0 } else { std },
    })
}

fn scale_series(series: &Series, params: &ScalerParams) -> Result<Series> {
    let ca = series
        .f64()
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

    let scaled: Float64Chunked = ca
        .into_iter()
        .map(|opt| opt.map(|v| (v - params.mean) / params.std))
        .collect();

    Ok(scaled.with_name(series.name().clone()).into_series())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_scaling_centers_and_scales() {
        let df = DataFrame::new(vec![Series::new(
            "a".into(),
            &[1.0, 2.0, 3.0, 4.0, 5.0],
        )
        .into()])
        .unwrap();

        let mut scaler = Scaler::new();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        let mean: f64 = col.mean().unwrap();
        assert!(mean.abs() < 1e-10);
        assert!((col.std(1).unwrap() - 1.0).abs() < 1e-10);
    }

    #[test]
    fn test_constant_column_scales_to_zero() {
        let df = DataFrame::new(vec![Series::new("a".into(), &[7.0, 7.0, 7.0]).into()]).unwrap();

        let mut scaler = Scaler::new();
        let result = scaler.fit_transform(&df, &["a"]).unwrap();

        let col = result.column("a").unwrap().f64().unwrap();
        for v in col.into_no_null_iter() {
            assert_eq!(v, 0.0);
        }
    }

    #[test]
    fn test_transform_applies_training_params() {
        let train =
            DataFrame::new(vec![Series::new("a".into(), &[0.0, 10.0]).into()]).unwrap();
        let other = DataFrame::new(vec![Series::new("a".into(), &[5.0]).into()]).unwrap();

        let mut scaler = Scaler::new();
        scaler.fit(&train, &["a"]).unwrap();
        let result = scaler.transform(&other).unwrap();

        // 5.0 is the training mean, so it maps to zero
        let v = result.column("a").unwrap().f64().unwrap().get(0).unwrap();
        assert!(v.abs() < 1e-10);
    }

    #[test]
    fn test_unfitted_transform_rejected() {
        let df = DataFrame::new(vec![Series::new("a".into(), &[1.0]).into()]).unwrap();
        let scaler = Scaler::new();
        assert!(matches!(
            scaler.transform(&df),
            Err(StudyMetricsError::ModelNotFitted)
        ));
    }
}
