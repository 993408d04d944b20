//! Online inference pipeline
//!
//! `CustomData` validates a single raw record; `PredictPipeline` loads the
//! persisted transformer and model and scores records.

mod custom_data;
mod predict;

pub use custom_data::CustomData;
pub use predict::PredictPipeline;
