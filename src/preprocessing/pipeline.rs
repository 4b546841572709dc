//! Data preprocessing pipeline

use super::{
    config::PreprocessingConfig, encoder::Encoder, scaler::Scaler, ColumnType, FeatureStats,
};
use crate::error::{KolosalError, Result};
use ndarray::{s, Array1, Array2};
use polars::prelude::*;
use std::collections::HashSet;
use std::time::Instant;
use tracing::info;

/// Numeric train/test matrices sharing one column layout
#[derive(Debug, Clone)]
pub struct FeatureMatrices {
    pub train_features: Array2<f64>,
    pub train_labels: Array1<f64>,
    pub test_features: Array2<f64>,
    /// Identifier column of the test table, in its original row order
    pub test_ids: Series,
    pub feature_names: Vec<String>,
}

impl FeatureMatrices {
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }
}

/// Preprocess the train and test tables with the default configuration
pub fn preprocess(train: &DataFrame, test: &DataFrame) -> Result<FeatureMatrices> {
    DataPreprocessor::new().preprocess(train, test)
}

/// Main data preprocessing pipeline
#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    config: PreprocessingConfig,
    numeric_columns: Vec<String>,
    categorical_columns: Vec<String>,
    scaler: Option<Scaler>,
    encoder: Option<Encoder>,
    feature_stats: Vec<FeatureStats>,
    is_fitted: bool,
}

impl Default for DataPreprocessor {
    fn default() -> Self {
        Self::new()
    }
}

impl DataPreprocessor {
    /// Create a new preprocessor with default configuration
    pub fn new() -> Self {
        Self::with_config(PreprocessingConfig::default())
    }

    /// Create a new preprocessor with custom configuration
    pub fn with_config(config: PreprocessingConfig) -> Self {
        Self {
            config,
            numeric_columns: Vec::new(),
            categorical_columns: Vec::new(),
            scaler: None,
            encoder: None,
            feature_stats: Vec::new(),
            is_fitted: false,
        }
    }

    pub fn config(&self) -> &PreprocessingConfig {
        &self.config
    }

    /// Build the feature matrices for a train/test pair.
    ///
    /// The identifier column is dropped from both tables and the target is
    /// split off the training table. Statistics and categories are computed on
    /// the concatenation of both feature sets, which is then split back by the
    /// original row counts.
    pub fn preprocess(&mut self, train: &DataFrame, test: &DataFrame) -> Result<FeatureMatrices> {
        let start = Instant::now();
        let id = self.config.id_column.clone();
        let target = self.config.target_column.clone();

        require_column(train, &id, "train")?;
        require_column(train, &target, "train")?;
        require_column(test, &id, "test")?;

        let feature_columns = feature_columns(train, &[id.as_str(), target.as_str()]);
        let test_columns = feature_columns_set(test, &[id.as_str()]);
        let train_set: HashSet<&str> = feature_columns.iter().map(|s| s.as_str()).collect();
        let test_set: HashSet<&str> = test_columns.iter().map(|s| s.as_str()).collect();
        if train_set != test_set {
            let mut only_train: Vec<&str> = train_set
                .iter()
                .filter(|c| !test_columns.contains(**c))
                .copied()
                .collect();
            let mut only_test: Vec<&str> = test_columns
                .iter()
                .filter(|c| !train_set.contains(c.as_str()))
                .map(|c| c.as_str())
                .collect();
            only_train.sort_unstable();
            only_test.sort_unstable();
            return Err(KolosalError::InvalidArgument(format!(
                "train and test feature columns differ (train only: {:?}, test only: {:?})",
                only_train, only_test
            )));
        }
        if feature_columns.is_empty() {
            return Err(KolosalError::InvalidArgument(
                "tables have no feature columns".to_string(),
            ));
        }

        let labels = extract_labels(train, &target)?;
        let test_ids = test.column(&id)?.as_materialized_series().clone();

        let (train_features, test_features) = align_dtypes(train, test, &feature_columns)?;
        let n_train = train_features.height();
        let combined = train_features.vstack(&test_features)?;

        self.fit(&combined)?;
        let matrix = self.transform(&combined)?;

        let train_matrix = matrix.slice(s![..n_train, ..]).to_owned();
        let test_matrix = matrix.slice(s![n_train.., ..]).to_owned();

        if train_matrix.ncols() != test_matrix.ncols() {
            return Err(KolosalError::InvalidArgument(format!(
                "encoded widths differ: train {}, test {}",
                train_matrix.ncols(),
                test_matrix.ncols()
            )));
        }

        info!(
            train_rows = train_matrix.nrows(),
            test_rows = test_matrix.nrows(),
            numeric = self.numeric_columns.len(),
            categorical = self.categorical_columns.len(),
            features = train_matrix.ncols(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Preprocessed features"
        );

        Ok(FeatureMatrices {
            train_features: train_matrix,
            train_labels: labels,
            test_features: test_matrix,
            test_ids,
            feature_names: self.feature_names(),
        })
    }

    /// Fit the scaler and encoder to a feature table.
    ///
    /// Float64 columns are numeric and String columns categorical; tables
    /// coming out of [`DataPreprocessor::preprocess`] only contain these two.
    pub fn fit(&mut self, df: &DataFrame) -> Result<&mut Self> {
        self.numeric_columns.clear();
        self.categorical_columns.clear();
        self.feature_stats.clear();

        for column in df.get_columns() {
            let name = column.name().to_string();
            match column.dtype() {
                DataType::Float64 => self.numeric_columns.push(name),
                DataType::String => self.categorical_columns.push(name),
                other => {
                    return Err(KolosalError::DataError(format!(
                        "column {} has unsupported dtype {}",
                        name, other
                    )))
                }
            }
        }

        let numeric: Vec<&str> = self.numeric_columns.iter().map(|s| s.as_str()).collect();
        let mut scaler = Scaler::new();
        scaler.fit(df, &numeric)?;

        let categorical: Vec<&str> = self.categorical_columns.iter().map(|s| s.as_str()).collect();
        let mut encoder = Encoder::new(self.config.missing_indicator);
        encoder.fit(df, &categorical)?;

        for name in &numeric {
            let column = df.column(name)?;
            let mut stats = FeatureStats::new(*name, ColumnType::Numeric);
            stats.count = column.len();
            stats.null_count = column.null_count();
            if let Some(params) = scaler.params(name) {
                stats.mean = Some(params.center);
                stats.std = Some(params.scale);
            }
            self.feature_stats.push(stats);
        }
        for name in &categorical {
            let column = df.column(name)?;
            let mut stats = FeatureStats::new(*name, ColumnType::Categorical);
            stats.count = column.len();
            stats.null_count = column.null_count();
            stats.n_categories = encoder.categories(name).map(|c| c.len());
            self.feature_stats.push(stats);
        }

        self.scaler = Some(scaler);
        self.encoder = Some(encoder);
        self.is_fitted = true;
        Ok(self)
    }

    /// Encode a feature table into a dense matrix (numeric columns first, then
    /// the indicator columns of each categorical column)
    pub fn transform(&self, df: &DataFrame) -> Result<Array2<f64>> {
        let (scaler, encoder) = match (&self.scaler, &self.encoder) {
            (Some(s), Some(e)) if self.is_fitted => (s, e),
            _ => {
                return Err(KolosalError::InvalidArgument(
                    "preprocessor is not fitted".to_string(),
                ))
            }
        };

        let mut columns = scaler.transform(df)?;
        columns.extend(encoder.transform(df)?);

        if columns.is_empty() {
            return Err(KolosalError::InvalidArgument(
                "no feature columns to encode".to_string(),
            ));
        }

        let encoded = DataFrame::new(columns)?;
        Ok(encoded.to_ndarray::<Float64Type>(IndexOrder::C)?)
    }

    /// Names of the output columns, in matrix order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = self.numeric_columns.clone();
        if let Some(encoder) = &self.encoder {
            names.extend(encoder.feature_names());
        }
        names
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric_columns
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical_columns
    }

    pub fn feature_stats(&self) -> &[FeatureStats] {
        &self.feature_stats
    }

    pub fn is_fitted(&self) -> bool {
        self.is_fitted
    }
}

fn require_column(df: &DataFrame, name: &str, table: &str) -> Result<()> {
    if df.column(name).is_err() {
        return Err(KolosalError::InvalidArgument(format!(
            "{} table has no column {}",
            table, name
        )));
    }
    Ok(())
}

fn feature_columns(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .map(|name| name.to_string())
        .filter(|name| !exclude.contains(&name.as_str()))
        .collect()
}

fn feature_columns_set(df: &DataFrame, exclude: &[&str]) -> HashSet<String> {
    feature_columns(df, exclude).into_iter().collect()
}

/// Target values as a vector; every value must be present and positive
fn extract_labels(df: &DataFrame, target: &str) -> Result<Array1<f64>> {
    let column = df.column(target)?.cast(&DataType::Float64)?;
    let ca = column
        .as_materialized_series()
        .f64()
        .map_err(|e| KolosalError::DataError(e.to_string()))?;

    let mut labels = Vec::with_capacity(ca.len());
    for (row, value) in ca.into_iter().enumerate() {
        match value {
            Some(v) if v > 0.0 && v.is_finite() => labels.push(v),
            Some(v) => {
                return Err(KolosalError::InvalidArgument(format!(
                    "{} must be positive, row {} has {}",
                    target, row, v
                )))
            }
            None => {
                return Err(KolosalError::InvalidArgument(format!(
                    "{} is missing in row {}",
                    target, row
                )))
            }
        }
    }

    Ok(Array1::from_vec(labels))
}

/// Dtype a column is processed as, or `Null` when the column holds no values
/// and should follow the other table
fn processing_dtype(column: &Column) -> DataType {
    if column.null_count() == column.len() {
        return DataType::Null;
    }
    match column.dtype() {
        DataType::Int8 | DataType::Int16 | DataType::Int32 | DataType::Int64 |
        DataType::UInt8 | DataType::UInt16 | DataType::UInt32 | DataType::UInt64 |
        DataType::Float32 | DataType::Float64 | DataType::Boolean => DataType::Float64,
        _ => DataType::String,
    }
}

/// Select the feature columns of both tables in train order and cast each
/// pair to a shared dtype: Float64 when numeric in both, String otherwise.
fn align_dtypes(
    train: &DataFrame,
    test: &DataFrame,
    columns: &[String],
) -> Result<(DataFrame, DataFrame)> {
    let mut train = train.select(columns.iter().map(|c| c.as_str()))?;
    let mut test = test.select(columns.iter().map(|c| c.as_str()))?;

    for name in columns {
        let a = processing_dtype(train.column(name)?);
        let b = processing_dtype(test.column(name)?);
        let shared = match (a, b) {
            (DataType::Null, DataType::Null) => DataType::Float64,
            (DataType::Null, other) | (other, DataType::Null) => other,
            (a, b) if a == b => a,
            _ => DataType::String,
        };

        let casted = train.column(name)?.cast(&shared)?;
        train.with_column(casted)?;
        let casted = test.column(name)?.cast(&shared)?;
        test.with_column(casted)?;
    }

    Ok((train, test))
}
