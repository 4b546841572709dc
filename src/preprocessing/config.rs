//! Preprocessing configuration

use serde::{Deserialize, Serialize};

/// Configuration for turning raw tables into feature matrices
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PreprocessingConfig {
    /// Row identifier column, dropped from the features of both tables
    pub id_column: String,

    /// Target column, present only in the training table
    pub target_column: String,

    /// Whether every categorical column gets a `<col>_nan` indicator
    pub missing_indicator: bool,
}

impl Default for PreprocessingConfig {
    fn default() -> Self {
        Self {
            id_column: "Id".to_string(),
            target_column: "SalePrice".to_string(),
            missing_indicator: true,
        }
    }
}

impl PreprocessingConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_id_column(mut self, column: impl Into<String>) -> Self {
        self.id_column = column.into();
        self
    }

    pub fn with_target_column(mut self, column: impl Into<String>) -> Self {
        self.target_column = column.into();
        self
    }

    pub fn with_missing_indicator(mut self, enabled: bool) -> Self {
        self.missing_indicator = enabled;
        self
    }
}
