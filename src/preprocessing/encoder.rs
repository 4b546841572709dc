//! One-hot encoding of categorical columns

use crate::error::{KolosalError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Suffix of the indicator column marking a missing value
pub const MISSING_SUFFIX: &str = "nan";

/// One-hot encoder with an optional missing-value indicator per column.
///
/// Categories are collected from the data the encoder is fitted on and kept in
/// lexicographic order, so the encoded layout depends only on the set of
/// observed values.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Encoder {
    /// column name -> sorted categories
    categories: Vec<(String, Vec<String>)>,
    missing_indicator: bool,
    is_fitted: bool,
}

impl Encoder {
    pub fn new(missing_indicator: bool) -> Self {
        Self {
            categories: Vec::new(),
            missing_indicator,
            is_fitted: false,
        }
    }

    /// Collect the categories of each String column
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.categories.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| KolosalError::FeatureNotFound(col_name.to_string()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| KolosalError::DataError(e.to_string()))?;

            let observed: BTreeSet<&str> = ca.into_iter().flatten().collect();
            let categories = observed.into_iter().map(|s| s.to_string()).collect();
            self.categories.push((col_name.to_string(), categories));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Indicator columns for every fitted column, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<Column>> {
        if !self.is_fitted {
            return Err(KolosalError::InvalidArgument("encoder is not fitted".to_string()));
        }

        let mut out = Vec::with_capacity(self.n_output_columns());
        for (col_name, categories) in &self.categories {
            let column = df
                .column(col_name)
                .map_err(|_| KolosalError::FeatureNotFound(col_name.clone()))?;
            let ca = column
                .as_materialized_series()
                .str()
                .map_err(|e| KolosalError::DataError(e.to_string()))?;

            for category in categories {
                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v == Some(category.as_str()) { 1.0 } else { 0.0 })
                    .collect();
                out.push(Column::new(format!("{}_{}", col_name, category).into(), values));
            }

            if self.missing_indicator {
                let values: Vec<f64> = ca
                    .into_iter()
                    .map(|v| if v.is_none() { 1.0 } else { 0.0 })
                    .collect();
                out.push(Column::new(
                    format!("{}_{}", col_name, MISSING_SUFFIX).into(),
                    values,
                ));
            }
        }

        Ok(out)
    }

    /// Names of the encoded columns, in output order
    pub fn feature_names(&self) -> Vec<String> {
        let mut names = Vec::with_capacity(self.n_output_columns());
        for (col_name, categories) in &self.categories {
            names.extend(categories.iter().map(|c| format!("{}_{}", col_name, c)));
            if self.missing_indicator {
                names.push(format!("{}_{}", col_name, MISSING_SUFFIX));
            }
        }
        names
    }

    pub fn categories(&self, column: &str) -> Option<&[String]> {
        self.categories
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, c)| c.as_slice())
    }

    pub fn n_output_columns(&self) -> usize {
        let extra = usize::from(self.missing_indicator);
        self.categories.iter().map(|(_, c)| c.len() + extra).sum()
    }
}
