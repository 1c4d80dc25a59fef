//! JSON run report export

use std::path::Path;

use chrono::Utc;
use serde::Serialize;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::model::ForestParams;
use crate::pipeline::Metrics;

pub const RUN_REPORT: &str = "run_report.json";

/// Metadata about the run
#[derive(Debug, Serialize)]
pub struct RunMetadata {
    /// Timestamp of the run (ISO 8601 format)
    pub timestamp: String,
    pub ysforest_version: String,
    pub input_file: String,
    pub processed_file: String,
    pub seed: u64,
    pub test_size: f64,
    pub search_mode: String,
    /// Folds used for cross-validation (only when a search ran)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cv_folds: Option<usize>,
}

/// Row and column counts
#[derive(Debug, Serialize)]
pub struct DatasetSummary {
    pub clean_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub features: Vec<String>,
    pub target: String,
}

/// Chosen hyperparameters and search result
#[derive(Debug, Serialize)]
pub struct ModelSummary {
    pub params: ForestParams,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_cv_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub candidates_evaluated: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct ImportanceEntry {
    pub feature: String,
    pub importance: f64,
}

#[derive(Debug, Serialize)]
pub struct PredictionEntry {
    pub sample: Vec<f64>,
    pub predicted: f64,
}

/// Complete run report
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub metadata: RunMetadata,
    pub dataset: DatasetSummary,
    pub model: ModelSummary,
    pub metrics: Metrics,
    /// Sorted by importance, descending
    pub feature_importances: Vec<ImportanceEntry>,
    pub prediction: PredictionEntry,
}

impl RunMetadata {
    pub fn from_config(config: &PipelineConfig, searched: bool) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            ysforest_version: env!("CARGO_PKG_VERSION").to_string(),
            input_file: config.raw_data.display().to_string(),
            processed_file: config.processed_data.display().to_string(),
            seed: config.seed,
            test_size: config.test_size,
            search_mode: config.search.to_string(),
            cv_folds: searched.then_some(config.cv_folds),
        }
    }
}

/// Write `report` as pretty JSON to `output_path`
pub fn export_run_report(report: &RunReport, output_path: &Path) -> Result<()> {
    if let Some(parent) = output_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| PipelineError::io(parent, e))?;
    }

    let json = serde_json::to_string_pretty(report)?;
    std::fs::write(output_path, json).map_err(|e| PipelineError::io(output_path, e))?;

    Ok(())
}
