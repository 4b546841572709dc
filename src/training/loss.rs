//! Loss functions

use crate::error::{KolosalError, Result};
use ndarray::Array1;
use tracing::debug;

/// Predictions below this value are raised to it before taking the log
pub const LOG_CLAMP_MIN: f64 = 1.0;

fn check_lengths(predictions: &Array1<f64>, labels: &Array1<f64>) -> Result<()> {
    if predictions.len() != labels.len() {
        return Err(KolosalError::ShapeError {
            expected: format!("{} predictions", labels.len()),
            actual: format!("{} predictions", predictions.len()),
        });
    }
    if labels.is_empty() {
        return Err(KolosalError::InvalidArgument("no labels to score".to_string()));
    }
    Ok(())
}

/// Mean squared error
pub fn mse(predictions: &Array1<f64>, labels: &Array1<f64>) -> Result<f64> {
    check_lengths(predictions, labels)?;
    let diff = predictions - labels;
    Ok(diff.mapv(|d| d * d).sum() / labels.len() as f64)
}

/// Root mean squared error between log predictions and log labels.
///
/// Returns the score together with the number of predictions that were below
/// [`LOG_CLAMP_MIN`] and had to be clamped.
pub fn clamped_log_rmse(predictions: &Array1<f64>, labels: &Array1<f64>) -> Result<(f64, usize)> {
    check_lengths(predictions, labels)?;

    let mut clamped = 0usize;
    let mut sum = 0.0;
    for (&pred, &label) in predictions.iter().zip(labels.iter()) {
        let pred = if pred < LOG_CLAMP_MIN || pred.is_nan() {
            clamped += 1;
            LOG_CLAMP_MIN
        } else {
            pred
        };
        let diff = pred.ln() - label.ln();
        sum += diff * diff;
    }

    Ok(((sum / labels.len() as f64).sqrt(), clamped))
}

/// Log-RMSE used to monitor training and compare folds
pub fn log_rmse(predictions: &Array1<f64>, labels: &Array1<f64>) -> Result<f64> {
    let (value, clamped) = clamped_log_rmse(predictions, labels)?;
    if clamped > 0 {
        debug!(clamped, total = labels.len(), "Clamped predictions before log");
    }
    Ok(value)
}
