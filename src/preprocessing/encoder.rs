//! One-hot encoding for categorical feature columns

use crate::error::{Result, StudyMetricsError};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// One-hot encoder over string columns.
///
/// Categories are recorded in sorted order at fit time, so the expanded
/// column layout is deterministic. A value unseen during fit encodes as
/// all zeros for that column's indicators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OneHotEncoder {
    /// Fitted columns in fit order, each with its sorted category list
    categories: Vec<(String, Vec<String>)>,
    is_fitted: bool,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self {
            categories: Vec::new(),
            is_fitted: false,
        }
    }

    /// Record the sorted distinct categories of each named column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.categories.clear();

        for col_name in columns {
            let column = df.column(col_name).map_err(|_| {
                StudyMetricsError::DataError(format!("column not found: {col_name}"))
            })?;
            let ca = column
                .str()
                .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;

            let distinct: BTreeSet<String> = ca
                .into_iter()
                .flatten()
                .map(|s| s.to_string())
                .collect();
            if distinct.is_empty() {
                return Err(StudyMetricsError::DataError(format!(
                    "categorical column has no values: {col_name}"
                )));
            }

            self.categories
                .push((col_name.to_string(), distinct.into_iter().collect()));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Replace each fitted column with its indicator columns.
    /// The original categorical columns are dropped from the result.
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted {
            return Err(StudyMetricsError::ModelNotFitted);
        }

        let mut result = df.clone();
        for (col_name, cats) in &self.categories {
            let column = result.column(col_name).map_err(|_| {
                StudyMetricsError::DataError(format!("column not found: {col_name}"))
            })?;
            let ca = column
                .str()
                .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
            let values: Vec<Option<String>> = ca
                .into_iter()
                .map(|opt| opt.map(|s| s.to_string()))
                .collect();

            let indicators: Vec<Series> = cats
                .iter()
                .map(|cat| {
                    let flags: Float64Chunked = values
                        .iter()
                        .map(|opt| {
                            Some(match opt {
                                Some(v) if v == cat => 1.0,
                                _ => 0.0,
                            })
                        })
                        .collect();
                    flags
                        .with_name(indicator_name(col_name, cat).into())
                        .into_series()
                })
                .collect();

            result = result
                .drop(col_name)
                .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
            for series in indicators {
                result = result
                    .with_column(series)
                    .map_err(|e| StudyMetricsError::DataError(e.to_string()))?
                    .clone();
            }
        }

        Ok(result)
    }

    /// Expanded column names in output order
    pub fn output_columns(&self) -> Vec<String> {
        self.categories
            .iter()
            .flat_map(|(col_name, cats)| {
                cats.iter().map(move |cat| indicator_name(col_name, cat))
            })
            .collect()
    }
}

impl Default for OneHotEncoder {
    fn default() -> Self {
        Self::new()
    }
}

fn indicator_name(col_name: &str, category: &str) -> String {
    format!("{col_name}_{category}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city_frame(values: &[&str]) -> DataFrame {
        DataFrame::new(vec![Series::new("city".into(), values).into()]).unwrap()
    }

    #[test]
    fn test_categories_sorted() {
        let df = city_frame(&["NYC", "LA", "SF", "LA"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city"]).unwrap();

        assert_eq!(
            encoder.output_columns(),
            vec!["city_LA", "city_NYC", "city_SF"]
        );
    }

    #[test]
    fn test_transform_drops_original_and_flags_match() {
        let df = city_frame(&["NYC", "LA", "NYC"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&df, &["city"]).unwrap();
        let result = encoder.transform(&df).unwrap();

        assert!(result.column("city").is_err());

        let nyc = result.column("city_NYC").unwrap().f64().unwrap();
        let la = result.column("city_LA").unwrap().f64().unwrap();
        assert_eq!(nyc.get(0), Some(1.0));
        assert_eq!(nyc.get(1), Some(0.0));
        assert_eq!(la.get(1), Some(1.0));
        assert_eq!(la.get(2), Some(0.0));
    }

    #[test]
    fn test_unseen_category_encodes_to_zeros() {
        let train = city_frame(&["NYC", "LA"]);
        let mut encoder = OneHotEncoder::new();
        encoder.fit(&train, &["city"]).unwrap();

        let other = city_frame(&["Tokyo"]);
        let result = encoder.transform(&other).unwrap();

        for name in encoder.output_columns() {
            let flag = result.column(&name).unwrap().f64().unwrap().get(0).unwrap();
            assert_eq!(flag, 0.0);
        }
    }

    #[test]
    fn test_unfitted_transform_rejected() {
        let encoder = OneHotEncoder::new();
        let df = city_frame(&["NYC"]);
        assert!(matches!(
            encoder.transform(&df),
            Err(StudyMetricsError::ModelNotFitted)
        ));
    }
}
