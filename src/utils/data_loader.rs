//! CSV loading and saving for raw tables

use crate::error::{KolosalError, Result};
use polars::prelude::*;
use std::fs::File;
use std::path::Path;
use std::time::Instant;
use tracing::debug;

/// Loads comma separated tables with a header row
#[derive(Debug, Clone)]
pub struct DataLoader {
    /// Rows scanned for schema inference (None = whole file)
    infer_schema_length: Option<usize>,
    /// Field values read as missing
    null_values: Vec<String>,
    delimiter: u8,
}

impl Default for DataLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl DataLoader {
    /// Create a loader that scans the whole file for its schema and reads
    /// `NA` as a missing value
    pub fn new() -> Self {
        Self {
            infer_schema_length: None,
            null_values: vec!["NA".to_string()],
            delimiter: b',',
        }
    }

    /// Limit schema inference to the first `n` rows
    pub fn with_infer_schema_length(mut self, n: Option<usize>) -> Self {
        self.infer_schema_length = n;
        self
    }

    /// Replace the set of field values read as missing
    pub fn with_null_values(mut self, values: Vec<String>) -> Self {
        self.null_values = values;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Load a CSV file
    pub fn load_csv(&self, path: impl AsRef<Path>) -> Result<DataFrame> {
        let path = path.as_ref();
        let start = Instant::now();
        let file = File::open(path)?;

        let null_values = if self.null_values.is_empty() {
            None
        } else {
            Some(NullValues::AllColumns(
                self.null_values.iter().map(|v| v.as_str().into()).collect(),
            ))
        };

        let parse_opts = CsvParseOptions::default()
            .with_separator(self.delimiter)
            .with_null_values(null_values);

        let df = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(self.infer_schema_length)
            .with_parse_options(parse_opts)
            .into_reader_with_file_handle(file)
            .finish()
            .map_err(|e| KolosalError::DataError(format!("{}: {}", path.display(), e)))?;

        debug!(
            path = %path.display(),
            rows = df.height(),
            cols = df.width(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Loaded CSV"
        );

        Ok(df)
    }
}

/// Writes tables back to disk
pub struct DataSaver;

impl DataSaver {
    /// Save to CSV with a header row
    pub fn save_csv(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path.as_ref())?;

        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| KolosalError::DataError(e.to_string()))
    }
}
