//! Cache-first data cleaning
//!
//! `DataPreprocessor::process` returns the processed CSV if it exists; otherwise it
//! cleans the raw file, persists the result and returns it.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use polars::prelude::*;

use crate::config::{PipelineConfig, INFER_SCHEMA_LENGTH, LABEL_COLS};
use crate::error::{PipelineError, Result};
use crate::pipeline::{load_dataset, save_dataset};
use crate::utils::Logger;

/// How an existing processed file is judged valid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CachePolicy {
    /// Any existing cache file is used, even if the raw data changed since
    #[default]
    Existence,
    /// The cache is rebuilt when the raw file was modified after it
    ModifiedTime,
}

impl std::fmt::Display for CachePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CachePolicy::Existence => write!(f, "existence"),
            CachePolicy::ModifiedTime => write!(f, "modified-time"),
        }
    }
}

impl std::str::FromStr for CachePolicy {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "existence" => Ok(CachePolicy::Existence),
            "modified-time" | "mtime" => Ok(CachePolicy::ModifiedTime),
            _ => Err(format!(
                "Unknown cache policy: '{}'. Use 'existence' or 'modified-time'.",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DataPreprocessor {
    raw_path: PathBuf,
    cache_path: PathBuf,
    label_columns: Vec<String>,
    policy: CachePolicy,
    infer_schema_length: usize,
}

impl DataPreprocessor {
    pub fn new(raw_path: impl Into<PathBuf>, cache_path: impl Into<PathBuf>) -> Self {
        Self {
            raw_path: raw_path.into(),
            cache_path: cache_path.into(),
            label_columns: LABEL_COLS.iter().map(|s| s.to_string()).collect(),
            policy: CachePolicy::default(),
            infer_schema_length: INFER_SCHEMA_LENGTH,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(&config.raw_data, &config.processed_data)
            .with_label_columns(config.label_cols.clone())
            .with_cache_policy(config.cache_policy)
            .with_infer_schema_length(config.infer_schema_length)
    }

    pub fn with_label_columns(mut self, label_columns: Vec<String>) -> Self {
        self.label_columns = label_columns;
        self
    }

    pub fn with_cache_policy(mut self, policy: CachePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_infer_schema_length(mut self, infer_schema_length: usize) -> Self {
        self.infer_schema_length = infer_schema_length;
        self
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    /// File `process` will read: the cache when valid, otherwise the raw data
    pub fn source_path(&self) -> &Path {
        if self.is_cache_valid() {
            &self.cache_path
        } else {
            &self.raw_path
        }
    }

    /// Whether `process` would return the cache without touching the raw file
    pub fn is_cache_valid(&self) -> bool {
        if !self.cache_path.is_file() {
            return false;
        }

        match self.policy {
            CachePolicy::Existence => true,
            CachePolicy::ModifiedTime => {
                match (modified(&self.raw_path), modified(&self.cache_path)) {
                    (Some(raw), Some(cache)) => cache >= raw,
                    // Nothing to compare against; keep the cache
                    _ => true,
                }
            }
        }
    }

    /// Remove the processed file. Returns whether one existed.
    pub fn invalidate(&self, log: &Logger) -> Result<bool> {
        if !self.cache_path.is_file() {
            return Ok(false);
        }
        std::fs::remove_file(&self.cache_path)
            .map_err(|e| PipelineError::io(&self.cache_path, e))?;
        log.info(format!("Removed processed cache {}", self.cache_path.display()));
        Ok(true)
    }

    /// Return a fully numeric, null-free dataset, from cache when possible.
    pub fn process(&self, log: &Logger) -> Result<DataFrame> {
        if self.is_cache_valid() {
            log.info(format!(
                "Found processed cache {}, skipping preprocessing",
                self.cache_path.display()
            ));
            return load_dataset(&self.cache_path, self.infer_schema_length, log);
        }

        if self.cache_path.is_file() {
            log.warning(format!(
                "Processed cache {} is older than {}, rebuilding",
                self.cache_path.display(),
                self.raw_path.display()
            ));
        }

        log.info("Running data cleaning...");
        let raw = load_dataset(&self.raw_path, self.infer_schema_length, log)?;
        let raw_rows = raw.height();

        let df = drop_incomplete_rows(&raw)?;
        if df.height() < raw_rows {
            log.info(format!(
                "Dropped {} row(s) with missing values",
                raw_rows - df.height()
            ));
        }

        let df = self.handle_outliers(df);

        let coerced = coerce_numeric(df, &self.label_columns)?;
        let before = coerced.height();
        let mut df = drop_incomplete_rows(&coerced)?;
        if df.height() < before {
            log.warning(format!(
                "Dropped {} row(s) with non-numeric values",
                before - df.height()
            ));
        }

        if df.height() == 0 {
            log.warning("No rows survived cleaning; the processed file will be empty");
        }

        save_dataset(&mut df, &self.cache_path)?;
        log.info(format!(
            "Processed {} of {} rows, saved to {}",
            df.height(),
            raw_rows,
            self.cache_path.display()
        ));

        Ok(df)
    }

    /// Outlier hook. Rows currently pass through unchanged.
    pub fn handle_outliers(&self, df: DataFrame) -> DataFrame {
        df
    }
}

/// Drop every row holding a null, or a NaN in a float column
pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let df = df.drop_nulls::<String>(None)?;

    let mut mask = BooleanChunked::full("keep".into(), true, df.height());
    for column in df.get_columns() {
        match column.dtype() {
            DataType::Float64 => mask = &mask & &column.f64()?.is_not_nan(),
            DataType::Float32 => mask = &mask & &column.f32()?.is_not_nan(),
            _ => {}
        }
    }

    Ok(df.filter(&mask)?)
}

/// Cast every non-label column to Float64; values that fail to parse become null
pub fn coerce_numeric(mut df: DataFrame, label_columns: &[String]) -> Result<DataFrame> {
    let numeric_columns: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|s| s.to_string())
        .filter(|name| !label_columns.contains(name))
        .collect();

    for name in &numeric_columns {
        let coerced = df.column(name)?.cast(&DataType::Float64)?;
        df.with_column(coerced)?;
    }

    Ok(df)
}

fn modified(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}
