//! Hyperparameter optimization module
//!
//! Grid search over learning rate, weight decay and batch size, scoring each
//! point by its mean k-fold validation log-RMSE.

mod grid;
mod search_space;

pub use grid::{GridSearch, SearchResult, Trial};
pub use search_space::{SearchSpace, TrialParams};
