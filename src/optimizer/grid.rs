//! Exhaustive grid search over training hyperparameters

use super::search_space::{SearchSpace, TrialParams};
use crate::error::{KolosalError, Result};
use crate::training::{k_fold, TrainingConfig};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::info;

/// Result of a single trial
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Trial {
    pub trial_id: usize,
    pub params: TrialParams,
    pub mean_train_log_rmse: f64,
    /// Objective value
    pub mean_valid_log_rmse: f64,
    pub duration_secs: f64,
}

/// All trials of a search and the one with the lowest validation score
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub trials: Vec<Trial>,
    pub best: Trial,
    pub total_duration_secs: f64,
}

impl SearchResult {
    /// Base configuration with the best trial's values substituted
    pub fn best_config(&self, base: &TrainingConfig) -> TrainingConfig {
        self.best.params.apply(base)
    }
}

/// Runs k-fold cross-validation for every point of a [`SearchSpace`]
#[derive(Debug, Clone)]
pub struct GridSearch {
    space: SearchSpace,
}

impl GridSearch {
    pub fn new(space: SearchSpace) -> Self {
        Self { space }
    }

    pub fn space(&self) -> &SearchSpace {
        &self.space
    }

    /// Evaluate every grid point with `base_config.k` folds and keep the one
    /// with the lowest mean validation log-RMSE
    pub fn run(
        &self,
        features: &Array2<f64>,
        labels: &Array1<f64>,
        base_config: &TrainingConfig,
    ) -> Result<SearchResult> {
        let start = Instant::now();
        let grid = self.space.grid()?;
        let mut trials: Vec<Trial> = Vec::with_capacity(grid.len());
        let mut best_idx: Option<usize> = None;

        for (trial_id, params) in grid.into_iter().enumerate() {
            let trial_start = Instant::now();
            let config = params.apply(base_config);
            config.validate()?;
            let results = k_fold(config.k, features, labels, &config)?;

            let trial = Trial {
                trial_id,
                params,
                mean_train_log_rmse: results.mean_train_log_rmse,
                mean_valid_log_rmse: results.mean_valid_log_rmse,
                duration_secs: trial_start.elapsed().as_secs_f64(),
            };
            info!(
                trial = trial_id,
                learning_rate = params.learning_rate,
                weight_decay = params.weight_decay,
                batch_size = params.batch_size,
                valid_log_rmse = trial.mean_valid_log_rmse,
                "Trial finished"
            );

            let is_better = match best_idx {
                None => true,
                Some(idx) => is_lower(trial.mean_valid_log_rmse, trials[idx].mean_valid_log_rmse),
            };
            if is_better {
                best_idx = Some(trials.len());
            }
            trials.push(trial);
        }

        let best = best_idx
            .map(|idx| trials[idx].clone())
            .ok_or_else(|| KolosalError::InvalidArgument("no trials were run".to_string()))?;

        info!(
            trials = trials.len(),
            best_trial = best.trial_id,
            best_valid_log_rmse = best.mean_valid_log_rmse,
            "Grid search finished"
        );

        Ok(SearchResult {
            trials,
            best,
            total_duration_secs: start.elapsed().as_secs_f64(),
        })
    }
}

/// NaN scores lose against any number
fn is_lower(candidate: f64, current: f64) -> bool {
    if current.is_nan() {
        !candidate.is_nan()
    } else {
        candidate < current
    }
}
