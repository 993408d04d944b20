//! Winner selection over an evaluation report

use tracing::info;

use crate::error::{Result, StudyMetricsError};
use crate::evaluator::Evaluated;
use crate::training::TrainedModel;

/// The selected model and its credentials
#[derive(Debug)]
pub struct Selection {
    pub name: String,
    pub model: TrainedModel,
    pub test_r2: f64,
}

/// Pick the best-scoring family by held-out test R².
///
/// Strict `>` comparison means ties resolve to the earliest entry in
/// registry order. A winning score below `quality_floor` is a hard stop:
/// `NoAcceptableModel` and nothing gets persisted.
pub fn select(evaluated: Evaluated, quality_floor: f64) -> Result<Selection> {
    let Evaluated { report, models } = evaluated;

    let mut best: Option<usize> = None;
    for (idx, score) in report.scores.iter().enumerate() {
        let is_better = match best {
            None => true,
            Some(b) => score.test_r2 > report.scores[b].test_r2,
        };
        if is_better {
            best = Some(idx);
        }
    }

    let best_idx = best.ok_or_else(|| StudyMetricsError::FitFailure {
        model: "all candidates".to_string(),
        reason: "evaluation produced no scores".to_string(),
    })?;

    let best_score = &report.scores[best_idx];

    if best_score.test_r2 < quality_floor {
        return Err(StudyMetricsError::NoAcceptableModel {
            best_model: best_score.name.clone(),
            best_score: best_score.test_r2,
            floor: quality_floor,
        });
    }

    info!(
        model = %best_score.name,
        test_r2 = best_score.test_r2,
        quality_floor,
        "model selected"
    );

    let mut models = models;
    let model = models.swap_remove(best_idx);

    Ok(Selection {
        name: best_score.name.clone(),
        model,
        test_r2: best_score.test_r2,
    })
}
