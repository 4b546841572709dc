//! Single-layer linear regressor trained by mini-batch gradient steps

use super::adam::Adam;
use super::loss::mse;
use crate::error::{KolosalError, Result};
use ndarray::{Array1, Array2};
use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Linear model `y = x · w + b`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearRegressor {
    pub weights: Array1<f64>,
    pub bias: f64,
}

impl LinearRegressor {
    /// Create a model with weights and bias drawn from U(-1/√n, 1/√n)
    pub fn new<R: Rng + ?Sized>(n_features: usize, rng: &mut R) -> Result<Self> {
        if n_features == 0 {
            return Err(KolosalError::InvalidArgument(
                "a linear model needs at least one feature".to_string(),
            ));
        }

        let bound = 1.0 / (n_features as f64).sqrt();
        let dist = Uniform::new(-bound, bound);
        let weights = Array1::from_iter((0..n_features).map(|_| dist.sample(rng)));
        let bias = dist.sample(rng);

        Ok(Self { weights, bias })
    }

    /// Build a model from known parameters
    pub fn from_parameters(weights: Array1<f64>, bias: f64) -> Self {
        Self { weights, bias }
    }

    pub fn n_features(&self) -> usize {
        self.weights.len()
    }

    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if x.ncols() != self.weights.len() {
            return Err(KolosalError::ShapeError {
                expected: format!("{} columns", self.weights.len()),
                actual: format!("{} columns", x.ncols()),
            });
        }
        Ok(x.dot(&self.weights) + self.bias)
    }

    /// One optimizer step on the mean squared error of a batch.
    ///
    /// Returns the batch loss measured before the update.
    pub fn fit_step(&mut self, x: &Array2<f64>, y: &Array1<f64>, optimizer: &mut Adam) -> Result<f64> {
        let predictions = self.predict(x)?;
        let loss = mse(&predictions, y)?;

        let residual = predictions - y;
        let scale = 2.0 / y.len() as f64;
        let grad_weights = x.t().dot(&residual) * scale;
        let grad_bias = residual.sum() * scale;

        optimizer.step(&mut self.weights, &mut self.bias, &grad_weights, grad_bias);
        Ok(loss)
    }
}
