//! End-to-end house price run: fetch, preprocess, validate, fit, submit

use crate::dataset::{DatasetCache, KAGGLE_HOUSE_TEST, KAGGLE_HOUSE_TRAIN};
use crate::error::Result;
use crate::optimizer::{GridSearch, SearchResult, SearchSpace};
use crate::preprocessing::{DataPreprocessor, PreprocessingConfig};
use crate::submission::SubmissionWriter;
use crate::training::{k_fold, train_and_pred, CVResults, TrainingConfig};
use crate::utils::DataLoader;
use polars::prelude::DataFrame;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::info;

/// Summary of a pipeline run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    /// Configuration used for cross-validation and the final fit
    pub config: TrainingConfig,
    pub n_features: usize,
    pub cv: CVResults,
    pub search: Option<SearchResult>,
    pub final_train_log_rmse: f64,
    pub submission_path: PathBuf,
    pub total_time_secs: f64,
}

impl PipelineReport {
    pub fn to_json_file(&self, path: impl AsRef<Path>) -> Result<()> {
        std::fs::write(path.as_ref(), serde_json::to_string_pretty(self)?)?;
        Ok(())
    }
}

/// Runs the full flow against the datasets registered in a [`DatasetCache`]
#[derive(Debug, Clone)]
pub struct HousePricePipeline {
    cache: DatasetCache,
    config: TrainingConfig,
    preprocessing: PreprocessingConfig,
    loader: DataLoader,
    search_space: Option<SearchSpace>,
    cv_report_path: Option<PathBuf>,
}

impl HousePricePipeline {
    pub fn new(cache: DatasetCache, config: TrainingConfig) -> Self {
        Self {
            cache,
            config,
            preprocessing: PreprocessingConfig::default(),
            loader: DataLoader::new(),
            search_space: None,
            cv_report_path: None,
        }
    }

    pub fn with_preprocessing(mut self, preprocessing: PreprocessingConfig) -> Self {
        self.preprocessing = preprocessing;
        self
    }

    pub fn with_loader(mut self, loader: DataLoader) -> Self {
        self.loader = loader;
        self
    }

    /// Grid search the hyperparameters before cross-validation
    pub fn with_search(mut self, space: SearchSpace) -> Self {
        self.search_space = Some(space);
        self
    }

    /// Also write the cross-validation results as JSON
    pub fn with_cv_report(mut self, path: impl Into<PathBuf>) -> Self {
        self.cv_report_path = Some(path.into());
        self
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fetch both tables through the cache, then run on them
    pub fn run(&self, output: impl AsRef<Path>) -> Result<PipelineReport> {
        let train_path = self.cache.resolve(KAGGLE_HOUSE_TRAIN)?;
        let test_path = self.cache.resolve(KAGGLE_HOUSE_TEST)?;

        let train = self.loader.load_csv(&train_path)?;
        let test = self.loader.load_csv(&test_path)?;
        info!(
            train_rows = train.height(),
            train_cols = train.width(),
            test_rows = test.height(),
            test_cols = test.width(),
            "Loaded tables"
        );

        self.run_on_frames(&train, &test, output)
    }

    /// Run on tables already in memory
    pub fn run_on_frames(
        &self,
        train: &DataFrame,
        test: &DataFrame,
        output: impl AsRef<Path>,
    ) -> Result<PipelineReport> {
        let start = Instant::now();
        self.config.validate()?;

        let mut preprocessor = DataPreprocessor::with_config(self.preprocessing.clone());
        let matrices = preprocessor.preprocess(train, test)?;

        let (config, search) = match &self.search_space {
            Some(space) => {
                let result = GridSearch::new(space.clone()).run(
                    &matrices.train_features,
                    &matrices.train_labels,
                    &self.config,
                )?;
                (result.best_config(&self.config), Some(result))
            }
            None => (self.config.clone(), None),
        };

        let cv = k_fold(config.k, &matrices.train_features, &matrices.train_labels, &config)?;
        info!(
            k = config.k,
            train_log_rmse = cv.mean_train_log_rmse,
            valid_log_rmse = cv.mean_valid_log_rmse,
            "{}-fold validation",
            config.k
        );
        if let Some(path) = &self.cv_report_path {
            cv.to_json_file(path)?;
        }

        let (history, predictions) = train_and_pred(
            &matrices.train_features,
            &matrices.train_labels,
            &matrices.test_features,
            &config,
        )?;

        let submission_path = SubmissionWriter::new()
            .with_columns(
                self.preprocessing.id_column.as_str(),
                self.preprocessing.target_column.as_str(),
            )
            .write(&matrices.test_ids, &predictions, output)?;

        Ok(PipelineReport {
            n_features: matrices.n_features(),
            cv,
            search,
            final_train_log_rmse: history.final_train().unwrap_or(f64::NAN),
            submission_path,
            total_time_secs: start.elapsed().as_secs_f64(),
            config,
        })
    }
}
