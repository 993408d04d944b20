//! Native model implementations
//!
//! Every regressor in the candidate catalog is implemented here:
//! - Decision trees and random forests
//! - Gradient boosting (first- and second-order)
//! - AdaBoost.R2
//! - Linear regression
//! plus the K-fold splitter and regression metrics they share.

pub mod adaboost;
pub mod cross_validation;
pub mod decision_tree;
pub mod gradient_boosting;
pub mod linear_regression;
pub mod metrics;
pub mod model;
pub mod random_forest;
pub mod xgboost;

pub use adaboost::AdaBoostRegressor;
pub use cross_validation::{CvResults, CvSplit, KFold};
pub use decision_tree::{Criterion, DecisionTree, TreeNode};
pub use gradient_boosting::{GradientBoostingConfig, GradientBoostingRegressor};
pub use linear_regression::LinearRegression;
pub use metrics::{r2_score, RegressionMetrics};
pub use model::{fit_candidate, TrainedModel};
pub use random_forest::{MaxFeatures, RandomForest};
pub use xgboost::{XgBoostConfig, XgBoostRegressor};
