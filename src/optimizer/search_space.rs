//! Hyperparameter grid definition

use crate::error::{KolosalError, Result};
use crate::training::TrainingConfig;
use serde::{Deserialize, Serialize};

/// Values tried for each tunable hyperparameter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchSpace {
    pub learning_rates: Vec<f64>,
    pub weight_decays: Vec<f64>,
    pub batch_sizes: Vec<usize>,
}

impl Default for SearchSpace {
    fn default() -> Self {
        Self {
            learning_rates: vec![0.5, 1.0, 5.0, 10.0],
            weight_decays: vec![0.0, 1.0, 10.0],
            batch_sizes: vec![32, 64, 128],
        }
    }
}

/// Hyperparameters of one grid point
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrialParams {
    pub learning_rate: f64,
    pub weight_decay: f64,
    pub batch_size: usize,
}

impl TrialParams {
    /// Copy of `base` with these values substituted
    pub fn apply(&self, base: &TrainingConfig) -> TrainingConfig {
        base.clone()
            .with_learning_rate(self.learning_rate)
            .with_weight_decay(self.weight_decay)
            .with_batch_size(self.batch_size)
    }
}

impl SearchSpace {
    pub fn new(learning_rates: Vec<f64>, weight_decays: Vec<f64>, batch_sizes: Vec<usize>) -> Self {
        Self {
            learning_rates,
            weight_decays,
            batch_sizes,
        }
    }

    /// Number of grid points
    pub fn len(&self) -> usize {
        self.learning_rates.len() * self.weight_decays.len() * self.batch_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All grid points, learning rate varying slowest
    pub fn grid(&self) -> Result<Vec<TrialParams>> {
        if self.is_empty() {
            return Err(KolosalError::InvalidArgument(
                "search space has no grid points".to_string(),
            ));
        }

        let mut points = Vec::with_capacity(self.len());
        for &learning_rate in &self.learning_rates {
            for &weight_decay in &self.weight_decays {
                for &batch_size in &self.batch_sizes {
                    points.push(TrialParams {
                        learning_rate,
                        weight_decay,
                        batch_size,
                    });
                }
            }
        }
        Ok(points)
    }
}
