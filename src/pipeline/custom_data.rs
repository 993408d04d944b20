//! Validated inference record

use polars::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::{Result, StudyMetricsError};

/// One raw student record: five categorical fields plus two score fields.
///
/// Construction validates every field; a bad value fails with `InvalidInput`
/// naming the field, never a clamp or a silent default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomData {
    pub gender: String,
    pub race_ethnicity: String,
    pub parental_level_of_education: String,
    pub lunch: String,
    pub test_preparation_course: String,
    pub reading_score: f64,
    pub writing_score: f64,
}

impl CustomData {
    /// Build a record from already-typed values
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        gender: impl Into<String>,
        race_ethnicity: impl Into<String>,
        parental_level_of_education: impl Into<String>,
        lunch: impl Into<String>,
        test_preparation_course: impl Into<String>,
        reading_score: f64,
        writing_score: f64,
    ) -> Result<Self> {
        let record = Self {
            gender: gender.into(),
            race_ethnicity: race_ethnicity.into(),
            parental_level_of_education: parental_level_of_education.into(),
            lunch: lunch.into(),
            test_preparation_course: test_preparation_course.into(),
            reading_score,
            writing_score,
        };
        record.validate()?;
        Ok(record)
    }

    /// Build a record from raw string fields, as they arrive at the boundary
    #[allow(clippy::too_many_arguments)]
    pub fn from_fields(
        gender: &str,
        race_ethnicity: &str,
        parental_level_of_education: &str,
        lunch: &str,
        test_preparation_course: &str,
        reading_score: &str,
        writing_score: &str,
    ) -> Result<Self> {
        Self::new(
            gender,
            race_ethnicity,
            parental_level_of_education,
            lunch,
            test_preparation_course,
            parse_score("reading_score", reading_score)?,
            parse_score("writing_score", writing_score)?,
        )
    }

    fn validate(&self) -> Result<()> {
        let categoricals = [
            ("gender", &self.gender),
            ("race_ethnicity", &self.race_ethnicity),
            (
                "parental_level_of_education",
                &self.parental_level_of_education,
            ),
            ("lunch", &self.lunch),
            ("test_preparation_course", &self.test_preparation_course),
        ];
        for (field, value) in categoricals {
            if value.trim().is_empty() {
                return Err(StudyMetricsError::InvalidInput {
                    field: field.to_string(),
                    reason: "value is empty".to_string(),
                });
            }
        }

        check_score_range("reading_score", self.reading_score)?;
        check_score_range("writing_score", self.writing_score)?;
        Ok(())
    }

    /// Convert to the one-row frame the transformer consumes
    pub fn to_dataframe(&self) -> Result<DataFrame> {
        let df = DataFrame::new(vec![
            Series::new("gender".into(), &[self.gender.as_str()]).into(),
            Series::new("race_ethnicity".into(), &[self.race_ethnicity.as_str()]).into(),
            Series::new(
                "parental_level_of_education".into(),
                &[self.parental_level_of_education.as_str()],
            )
            .into(),
            Series::new("lunch".into(), &[self.lunch.as_str()]).into(),
            Series::new(
                "test_preparation_course".into(),
                &[self.test_preparation_course.as_str()],
            )
            .into(),
            Series::new("reading_score".into(), &[self.reading_score]).into(),
            Series::new("writing_score".into(), &[self.writing_score]).into(),
        ])
        .map_err(|e| StudyMetricsError::DataError(e.to_string()))?;
        Ok(df)
    }
}

fn parse_score(field: &str, raw: &str) -> Result<f64> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| StudyMetricsError::InvalidInput {
            field: field.to_string(),
            reason: format!("not a number: {raw:?}"),
        })
}

fn check_score_range(field: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=100.0).contains(&value) {
        return Err(StudyMetricsError::InvalidInput {
            field: field.to_string(),
            reason: format!("score {value} outside [0, 100]"),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Result<CustomData> {
        CustomData::new(
            "female",
            "group B",
            "bachelor's degree",
            "standard",
            "none",
            72.0,
            74.0,
        )
    }

    #[test]
    fn test_valid_record_builds_one_row_frame() {
        let df = sample().unwrap().to_dataframe().unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), 7);
        assert_eq!(
            df.column("reading_score").unwrap().f64().unwrap().get(0),
            Some(72.0)
        );
    }

    #[test]
    fn test_out_of_range_score_names_field() {
        let err = CustomData::new(
            "female",
            "group B",
            "bachelor's degree",
            "standard",
            "none",
            72.0,
            101.0,
        )
        .unwrap_err();
        match err {
            StudyMetricsError::InvalidInput { field, .. } => {
                assert_eq!(field, "writing_score")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_non_numeric_score_names_field() {
        let err = CustomData::from_fields(
            "female",
            "group B",
            "bachelor's degree",
            "standard",
            "none",
            "seventy",
            "74",
        )
        .unwrap_err();
        match err {
            StudyMetricsError::InvalidInput { field, .. } => {
                assert_eq!(field, "reading_score")
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_categorical_rejected() {
        let err = CustomData::new("", "group B", "x", "standard", "none", 50.0, 50.0)
            .unwrap_err();
        assert!(matches!(
            err,
            StudyMetricsError::InvalidInput { ref field, .. } if field == "gender"
        ));
    }

    #[test]
    fn test_boundary_scores_accepted() {
        assert!(CustomData::new("m", "g", "e", "l", "t", 0.0, 100.0).is_ok());
    }
}
