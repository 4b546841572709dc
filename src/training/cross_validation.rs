//! K-fold cross-validation and the final fit

use super::adam::Adam;
use super::config::TrainingConfig;
use super::linear::LinearRegressor;
use super::loss::log_rmse;
use crate::error::{KolosalError, Result};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info};

/// Training and validation partitions for one fold
#[derive(Debug, Clone)]
pub struct FoldData {
    pub x_train: Array2<f64>,
    pub y_train: Array1<f64>,
    pub x_valid: Array2<f64>,
    pub y_valid: Array1<f64>,
}

/// Split rows into fold `i` of `k` for validation and the other folds for
/// training.
///
/// Folds are contiguous blocks of `n / k` rows; the trailing `n % k` rows
/// belong to no fold and are left out of both partitions.
pub fn get_k_fold_data(k: usize, i: usize, x: &Array2<f64>, y: &Array1<f64>) -> Result<FoldData> {
    if k < 2 {
        return Err(KolosalError::InvalidArgument(format!(
            "k must be at least 2, got {}",
            k
        )));
    }
    if i >= k {
        return Err(KolosalError::InvalidArgument(format!(
            "fold index {} out of range for k = {}",
            i, k
        )));
    }
    if x.nrows() != y.len() {
        return Err(KolosalError::InvalidArgument(format!(
            "features have {} rows but labels have {}",
            x.nrows(),
            y.len()
        )));
    }
    let n = x.nrows();
    if n < k {
        return Err(KolosalError::InvalidArgument(format!(
            "{} rows cannot be split into {} folds",
            n, k
        )));
    }

    let fold_size = n / k;
    let valid_indices: Vec<usize> = (i * fold_size..(i + 1) * fold_size).collect();
    let train_indices: Vec<usize> = (0..k * fold_size)
        .filter(|row| row / fold_size != i)
        .collect();

    Ok(FoldData {
        x_train: x.select(Axis(0), &train_indices),
        y_train: y.select(Axis(0), &train_indices),
        x_valid: x.select(Axis(0), &valid_indices),
        y_valid: y.select(Axis(0), &valid_indices),
    })
}

/// Log-RMSE per epoch
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainHistory {
    pub train_log_rmse: Vec<f64>,
    /// Empty when training ran without a validation set
    pub valid_log_rmse: Vec<f64>,
}

impl TrainHistory {
    pub fn final_train(&self) -> Option<f64> {
        self.train_log_rmse.last().copied()
    }

    pub fn final_valid(&self) -> Option<f64> {
        self.valid_log_rmse.last().copied()
    }

    pub fn n_epochs(&self) -> usize {
        self.train_log_rmse.len()
    }
}

/// Train `model` in place for `config.num_epochs` epochs of shuffled
/// mini-batches, recording the training (and optional validation) log-RMSE
/// after each epoch.
pub fn train(
    model: &mut LinearRegressor,
    train_x: &Array2<f64>,
    train_y: &Array1<f64>,
    valid: Option<(&Array2<f64>, &Array1<f64>)>,
    config: &TrainingConfig,
    rng: &mut ChaCha8Rng,
) -> Result<TrainHistory> {
    if train_x.nrows() != train_y.len() {
        return Err(KolosalError::InvalidArgument(format!(
            "features have {} rows but labels have {}",
            train_x.nrows(),
            train_y.len()
        )));
    }
    if train_x.nrows() == 0 {
        return Err(KolosalError::InvalidArgument("empty training set".to_string()));
    }
    if config.num_epochs == 0 {
        return Err(KolosalError::InvalidArgument(
            "num_epochs must be positive".to_string(),
        ));
    }
    if config.batch_size == 0 {
        return Err(KolosalError::InvalidArgument(
            "batch_size must be positive".to_string(),
        ));
    }

    let mut optimizer = Adam::new(config.learning_rate, config.weight_decay);
    let mut history = TrainHistory::default();
    let mut indices: Vec<usize> = (0..train_x.nrows()).collect();

    for epoch in 0..config.num_epochs {
        indices.shuffle(rng);
        for batch in indices.chunks(config.batch_size) {
            let batch_x = train_x.select(Axis(0), batch);
            let batch_y = train_y.select(Axis(0), batch);
            model.fit_step(&batch_x, &batch_y, &mut optimizer)?;
        }

        let train_score = log_rmse(&model.predict(train_x)?, train_y)?;
        history.train_log_rmse.push(train_score);

        match valid {
            Some((valid_x, valid_y)) => {
                let valid_score = log_rmse(&model.predict(valid_x)?, valid_y)?;
                history.valid_log_rmse.push(valid_score);
                debug!(epoch = epoch + 1, train_log_rmse = train_score, valid_log_rmse = valid_score, "Epoch finished");
            }
            None => {
                debug!(epoch = epoch + 1, train_log_rmse = train_score, "Epoch finished");
            }
        }
    }

    Ok(history)
}

/// Outcome of a single fold
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldResult {
    pub fold: usize,
    pub train_log_rmse: f64,
    pub valid_log_rmse: f64,
    pub history: TrainHistory,
}

/// Cross-validation results
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CVResults {
    pub k: usize,
    pub mean_train_log_rmse: f64,
    pub mean_valid_log_rmse: f64,
    pub folds: Vec<FoldResult>,
    pub training_time_secs: f64,
}

impl CVResults {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

/// Random generator for a run; seeded runs offset the seed so each fold gets
/// its own stream
pub(crate) fn seeded_rng(random_state: Option<u64>, offset: u64) -> ChaCha8Rng {
    match random_state {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed.wrapping_add(offset)),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Train a fresh model on each of `k` folds and average the final-epoch
/// log-RMSE over the folds
pub fn k_fold(
    k: usize,
    features: &Array2<f64>,
    labels: &Array1<f64>,
    config: &TrainingConfig,
) -> Result<CVResults> {
    if k < 2 {
        return Err(KolosalError::InvalidArgument(format!(
            "k must be at least 2, got {}",
            k
        )));
    }

    let start = Instant::now();
    let mut folds = Vec::with_capacity(k);

    for i in 0..k {
        let data = get_k_fold_data(k, i, features, labels)?;
        let mut rng = seeded_rng(config.random_state, i as u64);
        let mut model = LinearRegressor::new(features.ncols(), &mut rng)?;

        let history = train(
            &mut model,
            &data.x_train,
            &data.y_train,
            Some((&data.x_valid, &data.y_valid)),
            config,
            &mut rng,
        )?;

        let train_score = history.final_train().unwrap_or(f64::NAN);
        let valid_score = history.final_valid().unwrap_or(f64::NAN);
        info!(
            fold = i + 1,
            train_log_rmse = train_score,
            valid_log_rmse = valid_score,
            "Fold finished"
        );

        folds.push(FoldResult {
            fold: i + 1,
            train_log_rmse: train_score,
            valid_log_rmse: valid_score,
            history,
        });
    }

    let mean_train_log_rmse = folds.iter().map(|f| f.train_log_rmse).sum::<f64>() / k as f64;
    let mean_valid_log_rmse = folds.iter().map(|f| f.valid_log_rmse).sum::<f64>() / k as f64;

    info!(
        k,
        mean_train_log_rmse,
        mean_valid_log_rmse,
        "Cross-validation finished"
    );

    Ok(CVResults {
        k,
        mean_train_log_rmse,
        mean_valid_log_rmse,
        folds,
        training_time_secs: start.elapsed().as_secs_f64(),
    })
}

/// Train on the full training set and predict the test matrix
pub fn train_and_pred(
    train_x: &Array2<f64>,
    train_y: &Array1<f64>,
    test_x: &Array2<f64>,
    config: &TrainingConfig,
) -> Result<(TrainHistory, Array1<f64>)> {
    let mut rng = seeded_rng(config.random_state, config.k as u64);
    let mut model = LinearRegressor::new(train_x.ncols(), &mut rng)?;
    let history = train(&mut model, train_x, train_y, None, config, &mut rng)?;
    let predictions = model.predict(test_x)?;

    info!(
        train_log_rmse = history.final_train().unwrap_or(f64::NAN),
        predictions = predictions.len(),
        "Final model trained"
    );

    Ok((history, predictions))
}
