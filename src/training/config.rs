//! Training configuration

use crate::error::{KolosalError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Hyperparameters for k-fold training and the final fit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Number of folds
    pub k: usize,

    /// Passes over the training partition per fit
    pub num_epochs: usize,

    /// Adam step size
    pub learning_rate: f64,

    /// L2 penalty added to the gradient of every parameter
    pub weight_decay: f64,

    /// Mini-batch size
    pub batch_size: usize,

    /// Random seed; `None` draws from entropy
    pub random_state: Option<u64>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            k: 5,
            num_epochs: 100,
            learning_rate: 5.0,
            weight_decay: 0.0,
            batch_size: 64,
            random_state: None,
        }
    }
}

impl TrainingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a configuration from a JSON file; absent fields keep their defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn with_num_epochs(mut self, num_epochs: usize) -> Self {
        self.num_epochs = num_epochs;
        self
    }

    pub fn with_learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }

    pub fn with_weight_decay(mut self, weight_decay: f64) -> Self {
        self.weight_decay = weight_decay;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }

    /// Check the values that training cannot proceed without
    pub fn validate(&self) -> Result<()> {
        if self.k < 2 {
            return Err(KolosalError::InvalidArgument(format!(
                "k must be at least 2, got {}",
                self.k
            )));
        }
        if self.num_epochs == 0 {
            return Err(KolosalError::InvalidArgument(
                "num_epochs must be positive".to_string(),
            ));
        }
        if self.batch_size == 0 {
            return Err(KolosalError::InvalidArgument(
                "batch_size must be positive".to_string(),
            ));
        }
        if !(self.learning_rate.is_finite() && self.learning_rate > 0.0) {
            return Err(KolosalError::InvalidArgument(format!(
                "learning_rate must be positive, got {}",
                self.learning_rate
            )));
        }
        if !(self.weight_decay.is_finite() && self.weight_decay >= 0.0) {
            return Err(KolosalError::InvalidArgument(format!(
                "weight_decay must be non-negative, got {}",
                self.weight_decay
            )));
        }
        Ok(())
    }
}
