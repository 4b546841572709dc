//! Data preprocessing module
//!
//! Turns the raw train/test tables into numeric feature matrices:
//! - Numeric columns are standardized; missing values become 0
//! - Categorical columns are one-hot encoded with a missing-value indicator
//! - The encoded layout is derived once from train and test together, so both
//!   matrices always share the same columns

mod config;
mod encoder;
mod pipeline;
mod scaler;

pub use config::PreprocessingConfig;
pub use encoder::{Encoder, MISSING_SUFFIX};
pub use pipeline::{preprocess, DataPreprocessor, FeatureMatrices};
pub use scaler::{Scaler, ScalerParams};

use serde::{Deserialize, Serialize};

/// Column data type for preprocessing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnType {
    Numeric,
    Categorical,
}

/// Feature statistics computed during fit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureStats {
    pub name: String,
    pub dtype: ColumnType,
    pub count: usize,
    pub null_count: usize,
    pub mean: Option<f64>,
    pub std: Option<f64>,
    pub n_categories: Option<usize>,
}

impl FeatureStats {
    pub fn new(name: impl Into<String>, dtype: ColumnType) -> Self {
        Self {
            name: name.into(),
            dtype,
            count: 0,
            null_count: 0,
            mean: None,
            std: None,
            n_categories: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_stats_new() {
        let stats = FeatureStats::new("LotArea", ColumnType::Numeric);
        assert_eq!(stats.name, "LotArea");
        assert_eq!(stats.dtype, ColumnType::Numeric);
        assert_eq!(stats.count, 0);
    }

    #[test]
    fn test_column_type_serialize() {
        let json = serde_json::to_string(&ColumnType::Categorical).unwrap();
        assert_eq!(json, "\"Categorical\"");
    }
}
