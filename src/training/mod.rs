//! Model training module
//!
//! Provides the pieces for fitting the house price regressor:
//! - A single-layer linear model
//! - Adam with L2 weight decay
//! - MSE training loss and the log-RMSE evaluation metric
//! - K-fold cross-validation over contiguous folds and the final fit

mod adam;
mod config;
mod linear;
pub mod cross_validation;
pub mod loss;

pub use adam::Adam;
pub use config::TrainingConfig;
pub use cross_validation::{
    get_k_fold_data, k_fold, train, train_and_pred, CVResults, FoldData, FoldResult, TrainHistory,
};
pub use linear::LinearRegressor;
pub use loss::{clamped_log_rmse, log_rmse, mse};
