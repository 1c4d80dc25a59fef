//! Hyperparameter search with k-fold cross-validation
//!
//! Every (candidate, fold) pair is an independent forest fit. The fan-out runs on a
//! dedicated rayon pool sized by `jobs`, and scores are collected in task order so
//! the selected candidate never depends on thread scheduling.

use rand::seq::index;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::model::{ForestParams, RandomForestRegressor};
use crate::pipeline::{k_fold, r2_score, Dataset};
use crate::utils::{create_progress_bar, finish_with_success, Logger};

/// Which hyperparameter search (if any) precedes the final fit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// Fit the fixed default parameters
    #[default]
    None,
    /// Exhaustive sweep over the grid
    Grid,
    /// Seeded sample of `n_iter` grid points
    Random,
}

impl std::fmt::Display for SearchMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchMode::None => write!(f, "none"),
            SearchMode::Grid => write!(f, "grid"),
            SearchMode::Random => write!(f, "random"),
        }
    }
}

impl std::str::FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(SearchMode::None),
            "grid" => Ok(SearchMode::Grid),
            "random" | "randomized" => Ok(SearchMode::Random),
            _ => Err(format!(
                "Unknown search mode: '{}'. Use 'none', 'grid' or 'random'.",
                s
            )),
        }
    }
}

/// Values to sweep for each tunable forest parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParamGrid {
    pub n_estimators: Vec<usize>,
    pub max_depth: Vec<Option<usize>>,
    pub min_samples_split: Vec<usize>,
    pub min_samples_leaf: Vec<usize>,
}

impl Default for ParamGrid {
    fn default() -> Self {
        Self {
            n_estimators: vec![50, 100, 200],
            max_depth: vec![Some(3), Some(5), Some(7), Some(10), None],
            min_samples_split: vec![2, 5, 10],
            min_samples_leaf: vec![1, 2, 4],
        }
    }
}

impl ParamGrid {
    /// Number of combinations
    pub fn len(&self) -> usize {
        self.n_estimators.len()
            * self.max_depth.len()
            * self.min_samples_split.len()
            * self.min_samples_leaf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination applied on top of `base`.
    ///
    /// Keys are iterated alphabetically (max_depth, min_samples_leaf,
    /// min_samples_split, n_estimators) with the last varying fastest.
    pub fn candidates(&self, base: &ForestParams) -> Vec<ForestParams> {
        let mut candidates = Vec::with_capacity(self.len());
        for &max_depth in &self.max_depth {
            for &min_samples_leaf in &self.min_samples_leaf {
                for &min_samples_split in &self.min_samples_split {
                    for &n_estimators in &self.n_estimators {
                        candidates.push(ForestParams {
                            n_estimators,
                            max_depth,
                            min_samples_split,
                            min_samples_leaf,
                            ..base.clone()
                        });
                    }
                }
            }
        }
        candidates
    }

    /// `n_iter` distinct combinations drawn with `seed`; the whole grid when
    /// `n_iter` is at least its size.
    pub fn sample(&self, base: &ForestParams, n_iter: usize, seed: u64) -> Vec<ForestParams> {
        let all = self.candidates(base);
        if n_iter >= all.len() {
            return all;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        index::sample(&mut rng, all.len(), n_iter)
            .into_iter()
            .map(|i| all[i].clone())
            .collect()
    }
}

/// Cross-validation result for one candidate
#[derive(Debug, Clone, Serialize)]
pub struct CandidateScore {
    pub params: ForestParams,
    pub fold_scores: Vec<f64>,
    pub mean_score: f64,
    pub std_score: f64,
}

/// Outcome of a search, before the winner is refit
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    pub best_index: usize,
    pub best_params: ForestParams,
    pub best_score: f64,
    pub results: Vec<CandidateScore>,
}

/// Score each candidate by mean R² over `cv` folds of `dataset`.
///
/// The first candidate with the highest mean score wins.
pub fn cross_validate_candidates(
    candidates: &[ForestParams],
    dataset: &Dataset,
    cv: usize,
    jobs: usize,
    log: &Logger,
) -> Result<SearchOutcome> {
    if candidates.is_empty() {
        return Err(PipelineError::InvalidConfig(
            "hyperparameter search needs at least one candidate".to_string(),
        ));
    }

    let folds = k_fold(dataset.n_samples(), cv)?;
    let fold_data: Vec<(Dataset, Dataset)> = folds
        .iter()
        .map(|fold| (dataset.subset(&fold.train), dataset.subset(&fold.validation)))
        .collect();

    let total_fits = candidates.len() * cv;
    log.info(format!(
        "Fitting {} folds for each of {} candidates, totalling {} fits",
        cv,
        candidates.len(),
        total_fits
    ));

    let tasks: Vec<(usize, usize)> = (0..candidates.len())
        .flat_map(|c| (0..cv).map(move |f| (c, f)))
        .collect();

    let pool = build_pool(jobs)?;
    let pb = create_progress_bar(total_fits as u64, "Cross-validating", log.is_quiet());

    let scores: Vec<f64> = pool.install(|| {
        tasks
            .par_iter()
            .map(|&(c, f)| {
                let (train, validation) = &fold_data[f];
                let mut forest = RandomForestRegressor::new(candidates[c].clone());
                forest.fit(train)?;
                let predictions = forest.predict(&validation.features)?;

                // inc() is thread-safe
                pb.inc(1);

                Ok(r2_score(&validation.targets, &predictions))
            })
            .collect::<Result<Vec<f64>>>()
    })?;

    finish_with_success(&pb, &format!("Cross-validated {} candidates", candidates.len()));

    let results: Vec<CandidateScore> = candidates
        .iter()
        .zip(scores.chunks(cv))
        .map(|(params, fold_scores)| {
            let (mean_score, std_score) = mean_std(fold_scores);
            CandidateScore {
                params: params.clone(),
                fold_scores: fold_scores.to_vec(),
                mean_score,
                std_score,
            }
        })
        .collect();

    let mut best_index = 0;
    for (i, result) in results.iter().enumerate() {
        if result.mean_score > results[best_index].mean_score {
            best_index = i;
        }
    }

    Ok(SearchOutcome {
        best_index,
        best_params: results[best_index].params.clone(),
        best_score: results[best_index].mean_score,
        results,
    })
}

/// Rayon pool with `jobs` workers; 0 lets rayon use every core.
pub fn build_pool(jobs: usize) -> Result<ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(jobs)
        .build()
        .map_err(|e| PipelineError::InvalidConfig(format!("cannot start {} worker threads: {}", jobs, e)))
}

fn mean_std(values: &[f64]) -> (f64, f64) {
    if values.is_empty() {
        return (0.0, 0.0);
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    (mean, variance.sqrt())
}
