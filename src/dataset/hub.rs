//! Registry of remote datasets

use crate::error::{KolosalError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base URL of the bucket hosting the tutorial datasets
pub const DATA_URL: &str = "http://d2l-data.s3-accelerate.amazonaws.com/";

/// Registered name of the Kaggle house price training table
pub const KAGGLE_HOUSE_TRAIN: &str = "kaggle_house_train";

/// Registered name of the Kaggle house price test table
pub const KAGGLE_HOUSE_TEST: &str = "kaggle_house_test";

/// A remote dataset: where to fetch it and the digest its content must have
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    pub name: String,
    pub url: String,
    /// Hex encoded SHA-1 (40 chars) or SHA-256 (64 chars) digest
    pub content_hash: String,
}

impl DatasetEntry {
    pub fn new(
        name: impl Into<String>,
        url: impl Into<String>,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
            content_hash: content_hash.into(),
        }
    }

    /// File name used inside the cache directory.
    ///
    /// Taken from the last path segment of the URL, falling back to the
    /// dataset name when the URL ends with a slash.
    pub fn file_name(&self) -> String {
        let path = self
            .url
            .split(['?', '#'])
            .next()
            .unwrap_or_default();
        match path.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => segment.to_string(),
            _ => self.name.clone(),
        }
    }
}

/// Explicit dataset registry, keyed by name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataHub {
    entries: BTreeMap<String, DatasetEntry>,
}

impl DataHub {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the Kaggle house price tables
    pub fn kaggle_house() -> Self {
        let mut hub = Self::new();
        hub.register(DatasetEntry::new(
            KAGGLE_HOUSE_TRAIN,
            format!("{}kaggle_house_pred_train.csv", DATA_URL),
            "585e9cc93e70b39160e7921475f9bcd7d31219ce",
        ));
        hub.register(DatasetEntry::new(
            KAGGLE_HOUSE_TEST,
            format!("{}kaggle_house_pred_test.csv", DATA_URL),
            "fa19780a7b011d9b009e8bff8e99922a8ee2eb90",
        ));
        hub
    }

    /// Register a dataset, replacing any previous entry with the same name
    pub fn register(&mut self, entry: DatasetEntry) -> &mut Self {
        self.entries.insert(entry.name.clone(), entry);
        self
    }

    /// Builder form of [`DataHub::register`]
    pub fn with_entry(mut self, entry: DatasetEntry) -> Self {
        self.register(entry);
        self
    }

    /// Look up a registered dataset
    pub fn get(&self, name: &str) -> Result<&DatasetEntry> {
        self.entries
            .get(name)
            .ok_or_else(|| KolosalError::Lookup(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(|s| s.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
