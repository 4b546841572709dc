//! Submission file output

use crate::error::{KolosalError, Result};
use crate::utils::DataSaver;
use ndarray::Array1;
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes test predictions as an `Id,SalePrice` CSV
#[derive(Debug, Clone)]
pub struct SubmissionWriter {
    id_column: String,
    target_column: String,
}

impl Default for SubmissionWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl SubmissionWriter {
    pub fn new() -> Self {
        Self {
            id_column: "Id".to_string(),
            target_column: "SalePrice".to_string(),
        }
    }

    /// Override the header names
    pub fn with_columns(mut self, id_column: impl Into<String>, target_column: impl Into<String>) -> Self {
        self.id_column = id_column.into();
        self.target_column = target_column.into();
        self
    }

    /// Pair each id with its prediction, in the given order
    pub fn to_frame(&self, ids: &Series, predictions: &Array1<f64>) -> Result<DataFrame> {
        if ids.len() != predictions.len() {
            return Err(KolosalError::InvalidArgument(format!(
                "{} ids but {} predictions",
                ids.len(),
                predictions.len()
            )));
        }

        let ids = ids.clone().with_name(self.id_column.as_str().into()).into_column();
        let values = Column::new(
            self.target_column.as_str().into(),
            predictions.iter().copied().collect::<Vec<f64>>(),
        );
        Ok(DataFrame::new(vec![ids, values])?)
    }

    /// Write the submission file, creating its parent directory if needed
    pub fn write(&self, ids: &Series, predictions: &Array1<f64>, path: impl AsRef<Path>) -> Result<PathBuf> {
        let path = path.as_ref();
        let mut df = self.to_frame(ids, predictions)?;

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        DataSaver::save_csv(&mut df, path)?;

        info!(path = %path.display(), rows = df.height(), "Wrote submission");
        Ok(path.to_path_buf())
    }
}
