//! Feature preprocessing
//!
//! The fitted transformer that maps raw tabular records to the numeric
//! feature matrix the models consume: standard scaling for numeric columns,
//! one-hot encoding for categorical columns, with the output column order
//! recorded at fit time.

mod encoder;
mod pipeline;
mod scaler;

pub use encoder::OneHotEncoder;
pub use pipeline::{dataframe_to_array2, DataPreprocessor};
pub use scaler::Scaler;

use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}
