//! AdaBoost.R2 regressor
//!
//! Boosts shallow regression trees by resampling the training set with
//! weights that concentrate on hard examples. Per-round loss is the linear
//! loss normalized by the round's maximum error; the ensemble predicts the
//! weighted median of its members.

use super::decision_tree::DecisionTree;
use crate::error::{Result, StudyMetricsError};
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, WeightedIndex};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// AdaBoost.R2 regressor over shallow trees
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdaBoostRegressor {
    pub n_estimators: usize,
    pub learning_rate: f64,
    /// Depth of each weak learner
    pub max_depth: usize,
    pub random_state: Option<u64>,
    estimators: Vec<DecisionTree>,
    /// log(1 / beta) per estimator, used as median weights
    estimator_weights: Vec<f64>,
    is_fitted: bool,
}

impl Default for AdaBoostRegressor {
    fn default() -> Self {
        Self::new(50, 1.0)
    }
}

impl AdaBoostRegressor {
    pub fn new(n_estimators: usize, learning_rate: f64) -> Self {
        Self {
            n_estimators,
            learning_rate,
            max_depth: 3,
            random_state: None,
            estimators: Vec::new(),
            estimator_weights: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(StudyMetricsError::SchemaMismatch {
                expected: n_samples,
                actual: y.len(),
            });
        }
        if n_samples < 2 {
            return Err(StudyMetricsError::ValidationError(format!(
                "Need at least 2 samples, got {}",
                n_samples
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.random_state.unwrap_or(42));
        let mut weights = Array1::from_elem(n_samples, 1.0 / n_samples as f64);

        self.estimators.clear();
        self.estimator_weights.clear();

        for _round in 0..self.n_estimators {
            // Resample the training set according to current weights
            let dist = WeightedIndex::new(weights.iter()).map_err(|e| {
                StudyMetricsError::ComputationError(format!("degenerate sample weights: {}", e))
            })?;
            let sample_indices: Vec<usize> =
                (0..n_samples).map(|_| dist.sample(&mut rng)).collect();

            let x_boot = x.select(ndarray::Axis(0), &sample_indices);
            let y_boot: Array1<f64> =
                Array1::from_vec(sample_indices.iter().map(|&i| y[i]).collect());

            let mut tree = DecisionTree::new().with_max_depth(self.max_depth);
            tree.fit(&x_boot, &y_boot)?;

            // Linear loss on the full (unweighted) training set
            let predictions = tree.predict(x)?;
            let abs_errors: Vec<f64> = predictions
                .iter()
                .zip(y.iter())
                .map(|(p, t)| (p - t).abs())
                .collect();
            let max_error = abs_errors.iter().copied().fold(0.0f64, f64::max);

            if max_error <= 1e-12 {
                // Perfect member; give it a large weight and stop boosting
                self.estimators.push(tree);
                self.estimator_weights.push(1e9);
                break;
            }

            let losses: Vec<f64> = abs_errors.iter().map(|e| e / max_error).collect();
            let avg_loss: f64 = losses
                .iter()
                .zip(weights.iter())
                .map(|(l, w)| l * w)
                .sum();

            // A member worse than random gets discarded and boosting stops
            if avg_loss >= 0.5 {
                if self.estimators.is_empty() {
                    self.estimators.push(tree);
                    self.estimator_weights.push(1.0);
                }
                break;
            }

            let beta = avg_loss / (1.0 - avg_loss);

            // Down-weight well-predicted samples
            for (i, l) in losses.iter().enumerate() {
                weights[i] *= beta.powf(self.learning_rate * (1.0 - l));
            }
            let w_sum = weights.sum();
            if w_sum > 0.0 {
                weights /= w_sum;
            }

            self.estimators.push(tree);
            self.estimator_weights
                .push(self.learning_rate * (1.0 / beta).ln());
        }

        self.is_fitted = true;
        Ok(self)
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted || self.estimators.is_empty() {
            return Err(StudyMetricsError::ModelNotFitted);
        }

        let all_predictions: Vec<Array1<f64>> = self
            .estimators
            .iter()
            .map(|tree| tree.predict(x))
            .collect::<Result<Vec<_>>>()?;

        let n_samples = x.nrows();
        let predictions: Vec<f64> = (0..n_samples)
            .map(|i| {
                let member_preds: Vec<f64> = all_predictions.iter().map(|p| p[i]).collect();
                weighted_median(&member_preds, &self.estimator_weights)
            })
            .collect();

        Ok(Array1::from_vec(predictions))
    }

    /// Number of fitted members (may stop short of n_estimators)
    pub fn n_members(&self) -> usize {
        self.estimators.len()
    }
}

/// Weighted median: smallest value whose cumulative weight reaches half the total
fn weighted_median(values: &[f64], weights: &[f64]) -> f64 {
    let mut order: Vec<usize> = (0..values.len()).collect();
    order.sort_by(|&a, &b| {
        values[a]
            .partial_cmp(&values[b])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let total: f64 = weights.iter().sum();
    let mut cumulative = 0.0;
    for &idx in &order {
        cumulative += weights[idx];
        if cumulative >= total / 2.0 {
            return values[idx];
        }
    }
    values[order[order.len() - 1]]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::training::metrics::r2_score;
    use ndarray::{array, Array2};

    fn regression_data() -> (Array2<f64>, Array1<f64>) {
        let x =
            Array2::from_shape_vec((60, 2), (0..120).map(|i| i as f64 * 0.1).collect()).unwrap();
        let y: Array1<f64> = x
            .rows()
            .into_iter()
            .map(|r| r[0] * 3.0 - r[1] + 2.0)
            .collect();
        (x, y)
    }

    #[test]
    fn test_fit_quality() {
        let (x, y) = regression_data();
        let mut model = AdaBoostRegressor::new(20, 1.0).with_random_state(42);
        model.fit(&x, &y).unwrap();

        let preds = model.predict(&x).unwrap();
        let r2 = r2_score(&y, &preds);
        assert!(r2 > 0.8, "R² = {}", r2);
    }

    #[test]
    fn test_deterministic_with_seed() {
        let (x, y) = regression_data();
        let mut m1 = AdaBoostRegressor::new(10, 0.5).with_random_state(7);
        m1.fit(&x, &y).unwrap();
        let mut m2 = AdaBoostRegressor::new(10, 0.5).with_random_state(7);
        m2.fit(&x, &y).unwrap();
        assert_eq!(m1.predict(&x).unwrap(), m2.predict(&x).unwrap());
    }

    #[test]
    fn test_unfitted_predict_fails() {
        let model = AdaBoostRegressor::new(10, 1.0);
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict(&x),
            Err(StudyMetricsError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_weighted_median() {
        let values = [1.0, 2.0, 3.0];
        let weights = [0.1, 0.1, 0.8];
        assert_eq!(weighted_median(&values, &weights), 3.0);

        let equal = [1.0, 1.0, 1.0];
        assert_eq!(weighted_median(&values, &equal), 2.0);
    }
}
