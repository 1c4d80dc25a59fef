//! Error types for the yield-strength pipeline.
//!
//! Every stage returns `PipelineError` at its boundary so the orchestrator can
//! log one readable line before propagating.

use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while running the pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Input file does not exist.
    #[error("File not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// CSV could not be read or parsed.
    #[error("Failed to load dataset {}: {source}", path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    /// File system failure while creating, writing or removing a file.
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A configured feature or target column is absent from the dataset.
    #[error("Column '{column}' not found in dataset. Available columns: {available:?}")]
    MissingColumn {
        column: String,
        available: Vec<String>,
    },

    /// A training column holds a null or non-finite value.
    #[error("Column '{column}' has a missing or non-numeric value at row {row}")]
    NonNumeric { column: String, row: usize },

    /// No rows left to work with.
    #[error("Dataset is empty: {0}")]
    EmptyDataset(String),

    /// Settings that cannot produce a valid run.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Sample width differs from the number of features the model was fitted on.
    #[error("Expected {expected} feature values, got {actual}")]
    FeatureMismatch { expected: usize, actual: usize },

    /// Prediction was requested before `fit`.
    #[error("Model has not been fitted")]
    NotFitted,

    /// Chart rendering failed.
    #[error("Failed to render chart {}: {message}", path.display())]
    Render { path: PathBuf, message: String },

    /// Report serialization failed.
    #[error("Failed to serialize run report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error(transparent)]
    Polars(#[from] PolarsError),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, PipelineError>;
