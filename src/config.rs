//! Static pipeline constants and the per-run configuration built from them.

use std::path::PathBuf;

use crate::error::{PipelineError, Result};
use crate::model::ForestParams;
use crate::pipeline::{CachePolicy, ParamGrid, SearchMode};

pub const RAW_DATA: &str = "data/raw/materials.csv";
pub const PROCESSED_DATA: &str = "data/processed/materials_processed.csv";
pub const VIS_DIR: &str = "visualizations";
pub const LOG_DIR: &str = "logs";

pub const FEATURE_COLS: [&str; 9] = [
    "P(W)",
    "V(mm/s)",
    "H(um)",
    "T(um)",
    "Density(%)",
    "Hardness(HRA)",
    "E(MPa)",
    "UTS(MPa)",
    "EL(%)",
];

pub const TARGET_COL: &str = "YS(MPa)";

/// Descriptive columns exempt from numeric coercion.
pub const LABEL_COLS: [&str; 1] = ["Quality"];

pub const TEST_SIZE: f64 = 0.2;
pub const RANDOM_STATE: u64 = 42;
pub const CV_FOLDS: usize = 5;
pub const RANDOM_SEARCH_ITERATIONS: usize = 20;
pub const INFER_SCHEMA_LENGTH: usize = 10_000;

/// Sample predicted at the end of every run, in `FEATURE_COLS` order.
pub const NEW_SAMPLE: [f64; 9] = [160.0, 600.0, 100.0, 30.0, 97.0, 56.0, 16377.0, 565.0, 30.0];

/// Everything one pipeline run needs.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub raw_data: PathBuf,
    pub processed_data: PathBuf,
    pub vis_dir: PathBuf,
    pub feature_cols: Vec<String>,
    pub target_col: String,
    pub label_cols: Vec<String>,
    pub cache_policy: CachePolicy,
    pub test_size: f64,
    pub seed: u64,
    pub forest: ForestParams,
    pub search: SearchMode,
    pub grid: ParamGrid,
    pub cv_folds: usize,
    pub n_iter: usize,
    /// Worker threads for fitting; 0 uses every core.
    pub jobs: usize,
    pub sample: Vec<f64>,
    pub infer_schema_length: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            raw_data: PathBuf::from(RAW_DATA),
            processed_data: PathBuf::from(PROCESSED_DATA),
            vis_dir: PathBuf::from(VIS_DIR),
            feature_cols: FEATURE_COLS.iter().map(|s| s.to_string()).collect(),
            target_col: TARGET_COL.to_string(),
            label_cols: LABEL_COLS.iter().map(|s| s.to_string()).collect(),
            cache_policy: CachePolicy::Existence,
            test_size: TEST_SIZE,
            seed: RANDOM_STATE,
            forest: ForestParams::default(),
            search: SearchMode::None,
            grid: ParamGrid::default(),
            cv_folds: CV_FOLDS,
            n_iter: RANDOM_SEARCH_ITERATIONS,
            jobs: 0,
            sample: NEW_SAMPLE.to_vec(),
            infer_schema_length: INFER_SCHEMA_LENGTH,
        }
    }
}

impl PipelineConfig {
    /// Reject settings that cannot produce a valid run.
    pub fn validate(&self) -> Result<()> {
        if !(self.test_size > 0.0 && self.test_size < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test size must be between 0 and 1 (exclusive), got {}",
                self.test_size
            )));
        }
        if self.feature_cols.is_empty() {
            return Err(PipelineError::InvalidConfig(
                "at least one feature column is required".to_string(),
            ));
        }
        if self.sample.len() != self.feature_cols.len() {
            return Err(PipelineError::InvalidConfig(format!(
                "sample has {} values but {} feature columns are configured",
                self.sample.len(),
                self.feature_cols.len()
            )));
        }
        if self.search != SearchMode::None {
            if self.cv_folds < 2 {
                return Err(PipelineError::InvalidConfig(format!(
                    "cross-validation needs at least 2 folds, got {}",
                    self.cv_folds
                )));
            }
            if self.grid.is_empty() {
                return Err(PipelineError::InvalidConfig(
                    "parameter grid has no candidates".to_string(),
                ));
            }
        }
        if self.search == SearchMode::Random && self.n_iter == 0 {
            return Err(PipelineError::InvalidConfig(
                "randomized search needs at least one iteration".to_string(),
            ));
        }
        Ok(())
    }

    /// Forest parameters for the fixed-hyperparameter path, seeded with the run seed.
    pub fn fixed_params(&self) -> ForestParams {
        ForestParams {
            random_state: self.seed,
            ..self.forest.clone()
        }
    }
}
