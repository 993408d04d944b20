//! Trained model dispatch

use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

use super::adaboost::AdaBoostRegressor;
use super::decision_tree::DecisionTree;
use super::gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
use super::linear_regression::LinearRegression;
use super::random_forest::RandomForest;
use super::xgboost::{XgBoostConfig, XgBoostRegressor};
use crate::error::Result;
use crate::registry::CandidateParams;

/// A fitted regressor of any catalog family, serializable as one artifact
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TrainedModel {
    RandomForest(RandomForest),
    DecisionTree(DecisionTree),
    GradientBoosting(GradientBoostingRegressor),
    LinearRegression(LinearRegression),
    XgBoost(XgBoostRegressor),
    AdaBoost(AdaBoostRegressor),
}

impl TrainedModel {
    /// Make predictions with the underlying model
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            TrainedModel::RandomForest(m) => m.predict(x),
            TrainedModel::DecisionTree(m) => m.predict(x),
            TrainedModel::GradientBoosting(m) => m.predict(x),
            TrainedModel::LinearRegression(m) => m.predict(x),
            TrainedModel::XgBoost(m) => m.predict(x),
            TrainedModel::AdaBoost(m) => m.predict(x),
        }
    }

    /// Short family label for logging
    pub fn family(&self) -> &'static str {
        match self {
            TrainedModel::RandomForest(_) => "random_forest",
            TrainedModel::DecisionTree(_) => "decision_tree",
            TrainedModel::GradientBoosting(_) => "gradient_boosting",
            TrainedModel::LinearRegression(_) => "linear_regression",
            TrainedModel::XgBoost(_) => "xgboost",
            TrainedModel::AdaBoost(_) => "adaboost",
        }
    }
}

/// Fit a model for one grid point, threading the run seed through every
/// stochastic family
pub fn fit_candidate(
    params: &CandidateParams,
    x: &Array2<f64>,
    y: &Array1<f64>,
    seed: u64,
) -> Result<TrainedModel> {
    match params {
        CandidateParams::RandomForest { n_estimators } => {
            let mut model = RandomForest::new(*n_estimators).with_random_state(seed);
            model.fit(x, y)?;
            Ok(TrainedModel::RandomForest(model))
        }
        CandidateParams::DecisionTree { criterion } => {
            let mut model = DecisionTree::new().with_criterion(*criterion);
            model.fit(x, y)?;
            Ok(TrainedModel::DecisionTree(model))
        }
        CandidateParams::GradientBoosting {
            learning_rate,
            n_estimators,
        } => {
            let config = GradientBoostingConfig {
                n_estimators: *n_estimators,
                learning_rate: *learning_rate,
                random_state: Some(seed),
                ..Default::default()
            };
            let mut model = GradientBoostingRegressor::new(config);
            model.fit(x, y)?;
            Ok(TrainedModel::GradientBoosting(model))
        }
        CandidateParams::LinearRegression => {
            let mut model = LinearRegression::new();
            model.fit(x, y)?;
            Ok(TrainedModel::LinearRegression(model))
        }
        CandidateParams::XgBoost {
            learning_rate,
            n_estimators,
        } => {
            let config = XgBoostConfig {
                n_estimators: *n_estimators,
                learning_rate: *learning_rate,
                random_state: Some(seed),
                ..Default::default()
            };
            let mut model = XgBoostRegressor::new(config);
            model.fit(x, y)?;
            Ok(TrainedModel::XgBoost(model))
        }
        CandidateParams::AdaBoost {
            learning_rate,
            n_estimators,
        } => {
            let mut model =
                AdaBoostRegressor::new(*n_estimators, *learning_rate).with_random_state(seed);
            model.fit(x, y)?;
            Ok(TrainedModel::AdaBoost(model))
        }
    }
}
