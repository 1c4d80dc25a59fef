//! Command-line argument definitions using clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::{
    PipelineConfig, CV_FOLDS, INFER_SCHEMA_LENGTH, LOG_DIR, PROCESSED_DATA, RANDOM_SEARCH_ITERATIONS,
    RANDOM_STATE, RAW_DATA, TEST_SIZE, VIS_DIR,
};
use crate::pipeline::{CachePolicy, SearchMode};

/// ysforest - Predict yield strength of printed materials with a random forest
#[derive(Parser, Debug)]
#[command(name = "ysforest")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Raw materials CSV
    #[arg(short, long, default_value = RAW_DATA)]
    pub input: PathBuf,

    /// Processed dataset cache. Reused as-is when it exists (see --cache-policy).
    #[arg(short, long, default_value = PROCESSED_DATA)]
    pub processed: PathBuf,

    /// Directory for charts and the JSON run report
    #[arg(long, default_value = VIS_DIR)]
    pub vis_dir: PathBuf,

    /// Directory for daily log files
    #[arg(long, default_value = LOG_DIR)]
    pub log_dir: PathBuf,

    /// Hyperparameter search before the final fit.
    /// Options: "none" (fixed parameters, default), "grid" or "random"
    #[arg(long, default_value_t = SearchMode::None)]
    pub search: SearchMode,

    /// Cross-validation folds used by the search
    #[arg(long, default_value_t = CV_FOLDS)]
    pub cv: usize,

    /// Candidates sampled by the random search
    #[arg(long, default_value_t = RANDOM_SEARCH_ITERATIONS)]
    pub n_iter: usize,

    /// Worker threads for fitting. 0 uses every core.
    #[arg(short, long, default_value_t = 0)]
    pub jobs: usize,

    /// Fraction of rows held out for evaluation (0.0 to 1.0, exclusive)
    #[arg(long, default_value_t = TEST_SIZE, value_parser = validate_test_size)]
    pub test_size: f64,

    /// Seed for the split, the forest and the random search
    #[arg(long, default_value_t = RANDOM_STATE)]
    pub seed: u64,

    /// When an existing processed file is trusted.
    /// Options: "existence" (default) or "modified-time" (rebuild if the raw file is newer)
    #[arg(long, default_value_t = CachePolicy::Existence)]
    pub cache_policy: CachePolicy,

    /// Sample to predict, one value per feature column (comma-separated).
    /// Defaults to 160,600,100,30,97,56,16377,565,30.
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub sample: Vec<f64>,

    /// Number of rows to use for schema inference.
    /// Use 0 for full table scan.
    #[arg(long, default_value_t = INFER_SCHEMA_LENGTH)]
    pub infer_schema_length: usize,

    /// Only write the log file; no console output
    #[arg(short, long, default_value = "false")]
    pub quiet: bool,
}

impl Cli {
    /// Apply the flags on top of the default configuration
    pub fn to_config(&self) -> PipelineConfig {
        let defaults = PipelineConfig::default();
        PipelineConfig {
            raw_data: self.input.clone(),
            processed_data: self.processed.clone(),
            vis_dir: self.vis_dir.clone(),
            cache_policy: self.cache_policy,
            test_size: self.test_size,
            seed: self.seed,
            search: self.search,
            cv_folds: self.cv,
            n_iter: self.n_iter,
            jobs: self.jobs,
            sample: if self.sample.is_empty() {
                defaults.sample.clone()
            } else {
                self.sample.clone()
            },
            infer_schema_length: self.infer_schema_length,
            ..defaults
        }
    }
}

/// Validator for test_size parameter
fn validate_test_size(s: &str) -> Result<f64, String> {
    let value: f64 = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;

    if value > 0.0 && value < 1.0 {
        Ok(value)
    } else {
        Err(format!(
            "test_size must be between 0.0 and 1.0 (exclusive), got {}",
            value
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_test_size() {
        assert_eq!(validate_test_size("0.25"), Ok(0.25));
        assert!(validate_test_size("0").is_err());
        assert!(validate_test_size("1.0").is_err());
        assert!(validate_test_size("abc").is_err());
    }
}
