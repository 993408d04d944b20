//! Candidate model catalog
//!
//! The registry is a closed, ordered enumeration of the regressors the
//! trainer considers, each with its hyperparameter grid fully expanded.
//! Iteration order is stable and doubles as the tie-break order during
//! selection.

use crate::training::decision_tree::Criterion;
use serde::{Deserialize, Serialize};

/// Fully-specified hyperparameters for one grid point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model")]
pub enum CandidateParams {
    RandomForest {
        n_estimators: usize,
    },
    DecisionTree {
        criterion: Criterion,
    },
    GradientBoosting {
        learning_rate: f64,
        n_estimators: usize,
    },
    LinearRegression,
    XgBoost {
        learning_rate: f64,
        n_estimators: usize,
    },
    AdaBoost {
        learning_rate: f64,
        n_estimators: usize,
    },
}

/// One registry entry: a named model family and its grid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryEntry {
    /// Unique display name
    pub name: String,
    /// Expanded hyperparameter grid; empty means a single default fit
    pub grid: Vec<CandidateParams>,
    /// Parameters used when the grid is empty
    pub default_params: CandidateParams,
}

impl RegistryEntry {
    /// The parameter sets to evaluate: the grid, or the single default
    pub fn candidates(&self) -> Vec<CandidateParams> {
        if self.grid.is_empty() {
            vec![self.default_params.clone()]
        } else {
            self.grid.clone()
        }
    }
}

/// Ordered catalog of candidate regressors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelRegistry {
    entries: Vec<RegistryEntry>,
}

impl ModelRegistry {
    /// The standard catalog used by the training pipeline
    pub fn standard() -> Self {
        let lr_grid = |def: fn(f64, usize) -> CandidateParams| -> Vec<CandidateParams> {
            let mut grid = Vec::new();
            for &lr in &[0.05, 0.1] {
                for &n in &[50, 100] {
                    grid.push(def(lr, n));
                }
            }
            grid
        };

        let entries = vec![
            RegistryEntry {
                name: "Random Forest".to_string(),
                grid: [50, 100, 200]
                    .iter()
                    .map(|&n| CandidateParams::RandomForest { n_estimators: n })
                    .collect(),
                default_params: CandidateParams::RandomForest { n_estimators: 100 },
            },
            RegistryEntry {
                name: "Decision Tree".to_string(),
                grid: vec![
                    CandidateParams::DecisionTree {
                        criterion: Criterion::SquaredError,
                    },
                    CandidateParams::DecisionTree {
                        criterion: Criterion::FriedmanMse,
                    },
                ],
                default_params: CandidateParams::DecisionTree {
                    criterion: Criterion::SquaredError,
                },
            },
            RegistryEntry {
                name: "Gradient Boosting".to_string(),
                grid: lr_grid(|learning_rate, n_estimators| CandidateParams::GradientBoosting {
                    learning_rate,
                    n_estimators,
                }),
                default_params: CandidateParams::GradientBoosting {
                    learning_rate: 0.1,
                    n_estimators: 100,
                },
            },
            RegistryEntry {
                name: "Linear Regression".to_string(),
                grid: Vec::new(),
                default_params: CandidateParams::LinearRegression,
            },
            RegistryEntry {
                name: "XGBRegressor".to_string(),
                grid: lr_grid(|learning_rate, n_estimators| CandidateParams::XgBoost {
                    learning_rate,
                    n_estimators,
                }),
                default_params: CandidateParams::XgBoost {
                    learning_rate: 0.1,
                    n_estimators: 100,
                },
            },
            RegistryEntry {
                name: "AdaBoost Regressor".to_string(),
                grid: lr_grid(|learning_rate, n_estimators| CandidateParams::AdaBoost {
                    learning_rate,
                    n_estimators,
                }),
                default_params: CandidateParams::AdaBoost {
                    learning_rate: 0.1,
                    n_estimators: 50,
                },
            },
        ];

        Self { entries }
    }

    /// Entries in registry order
    pub fn entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Number of model families
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Position of a model family by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.name == name)
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
