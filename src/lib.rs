//! Kolosal House Prices - k-fold linear regression on the Kaggle house price data
//!
//! This crate provides the full flow from raw CSV files to a submission:
//! - Dataset registry and verified download cache
//! - Feature preprocessing (standardization, one-hot encoding)
//! - Linear regression trained with Adam on mini-batches
//! - K-fold cross-validation scored by log-RMSE
//! - Grid search over training hyperparameters
//! - Submission file output
//!
//! # Modules
//!
//! - [`dataset`] - Dataset registry, download cache, archive extraction
//! - [`utils`] - CSV loading and saving
//! - [`preprocessing`] - Raw tables to feature matrices
//! - [`training`] - Linear model, optimizer, losses, cross-validation
//! - [`optimizer`] - Hyperparameter grid search
//! - [`submission`] - `Id,SalePrice` output
//! - [`pipeline`] - End-to-end runner

// Core error handling
pub mod error;

// Data access
pub mod dataset;
pub mod utils;

// Core ML modules
pub mod preprocessing;
pub mod training;
pub mod optimizer;

// Output
pub mod submission;
pub mod pipeline;

pub use error::{KolosalError, Result};

/// Re-export commonly used types
pub mod prelude {
    // Error handling
    pub use crate::error::{KolosalError, Result};

    // Data access
    pub use crate::dataset::{DataHub, DatasetCache, DatasetEntry, KAGGLE_HOUSE_TEST, KAGGLE_HOUSE_TRAIN};
    pub use crate::utils::{DataLoader, DataSaver};

    // Preprocessing
    pub use crate::preprocessing::{preprocess, DataPreprocessor, FeatureMatrices, PreprocessingConfig};

    // Training
    pub use crate::training::{
        get_k_fold_data, k_fold, log_rmse, train, train_and_pred, Adam, CVResults, LinearRegressor,
        TrainingConfig,
    };

    // Optimization
    pub use crate::optimizer::{GridSearch, SearchResult, SearchSpace};

    // Output
    pub use crate::pipeline::{HousePricePipeline, PipelineReport};
    pub use crate::submission::SubmissionWriter;
}
