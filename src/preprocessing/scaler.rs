//! Standardization of numeric columns

use crate::error::{KolosalError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Parameters for a fitted column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalerParams {
    pub center: f64,
    pub scale: f64,
}

/// Z-score scaler: `(x - mean) / std`, with the sample (ddof = 1) standard
/// deviation. Missing values are written as 0 after scaling, which is the same
/// as mean imputation beforehand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scaler {
    params: Vec<(String, ScalerParams)>,
    is_fitted: bool,
}

impl Default for Scaler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scaler {
    pub fn new() -> Self {
        Self {
            params: Vec::new(),
            is_fitted: false,
        }
    }

    /// Fit the scaler to the given Float64 columns
    pub fn fit(&mut self, df: &DataFrame, columns: &[&str]) -> Result<&mut Self> {
        self.params.clear();
        for col_name in columns {
            let column = df
                .column(col_name)
                .map_err(|_| KolosalError::FeatureNotFound(col_name.to_string()))?;
            let params = Self::compute_params(col_name, column.as_materialized_series())?;
            self.params.push((col_name.to_string(), params));
        }

        self.is_fitted = true;
        Ok(self)
    }

    /// Scaled copies of the fitted columns, in fit order
    pub fn transform(&self, df: &DataFrame) -> Result<Vec<Column>> {
        if !self.is_fitted {
            return Err(KolosalError::InvalidArgument("scaler is not fitted".to_string()));
        }

        self.params
            .iter()
            .map(|(col_name, params)| {
                let column = df
                    .column(col_name)
                    .map_err(|_| KolosalError::FeatureNotFound(col_name.clone()))?;
                self.scale_series(column.as_materialized_series(), params)
                    .map(|s| s.into_column())
            })
            .collect()
    }

    pub fn params(&self, column: &str) -> Option<&ScalerParams> {
        self.params
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, p)| p)
    }

    pub fn columns(&self) -> Vec<&str> {
        self.params.iter().map(|(name, _)| name.as_str()).collect()
    }

    fn compute_params(name: &str, series: &Series) -> Result<ScalerParams> {
        let ca = series
            .f64()
            .map_err(|e| KolosalError::DataError(e.to_string()))?;

        let mean = ca.mean().unwrap_or(0.0);
        let std = ca.std(1).unwrap_or(0.0);

        // Constant (or near-empty) columns carry no signal; every value equals
        // the mean, so a unit scale maps them to an all-zero column.
        let scale = if std.is_finite() && std > 0.0 {
            std
        } else {
            warn!(column = %name, "Zero variance column, emitting zeros");
            1.0
        };

        Ok(ScalerParams { center: mean, scale })
    }

    fn scale_series(&self, series: &Series, params: &ScalerParams) -> Result<Series> {
        let ca = series
            .f64()
            .map_err(|e| KolosalError::DataError(e.to_string()))?;

        let scaled: Vec<f64> = ca
            .into_iter()
            .map(|opt| opt.map_or(0.0, |v| (v - params.center) / params.scale))
            .collect();

        Ok(Series::new(series.name().clone(), scaled))
    }
}
