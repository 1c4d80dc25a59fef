//! Random forest regressor: bagged regression trees fitted in parallel

use std::fmt;

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;

use super::tree::{RegressionTree, TreeParams};
use crate::error::{PipelineError, Result};
use crate::pipeline::Dataset;

/// Random forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForestParams {
    /// Number of trees in the forest
    pub n_estimators: usize,
    /// Maximum depth of each tree (None = unlimited)
    pub max_depth: Option<usize>,
    /// Minimum samples to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf
    pub min_samples_leaf: usize,
    /// Features considered per split (None = all)
    pub max_features: Option<usize>,
    /// Bootstrap sampling
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `random_state + i`
    pub random_state: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            bootstrap: true,
            random_state: 42,
        }
    }
}

impl fmt::Display for ForestParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let depth = self
            .max_depth
            .map(|d| d.to_string())
            .unwrap_or_else(|| "None".to_string());
        write!(
            f,
            "n_estimators={}, max_depth={}, min_samples_split={}, min_samples_leaf={}, random_state={}",
            self.n_estimators, depth, self.min_samples_split, self.min_samples_leaf, self.random_state
        )
    }
}

/// Random Forest model
#[derive(Debug, Clone)]
pub struct RandomForestRegressor {
    params: ForestParams,
    trees: Vec<RegressionTree>,
    feature_names: Vec<String>,
    feature_importances: Vec<f64>,
}

impl RandomForestRegressor {
    pub fn new(params: ForestParams) -> Self {
        Self {
            params,
            trees: Vec::new(),
            feature_names: Vec::new(),
            feature_importances: Vec::new(),
        }
    }

    /// Train the forest. Trees are built in parallel on the current rayon pool and
    /// collected in index order, so the result does not depend on scheduling.
    pub fn fit(&mut self, dataset: &Dataset) -> Result<()> {
        let n_samples = dataset.n_samples();
        if n_samples == 0 {
            return Err(PipelineError::EmptyDataset(
                "cannot fit a forest on zero samples".to_string(),
            ));
        }
        if self.params.n_estimators == 0 {
            return Err(PipelineError::InvalidConfig(
                "n_estimators must be at least 1".to_string(),
            ));
        }

        self.feature_names = dataset.feature_names.clone();
        let n_features = dataset.n_features();
        let params = &self.params;

        let trees: Vec<RegressionTree> = (0..params.n_estimators)
            .into_par_iter()
            .map(|i| {
                let seed = params.random_state.wrapping_add(i as u64);
                let mut tree = RegressionTree::new(TreeParams {
                    max_depth: params.max_depth,
                    min_samples_split: params.min_samples_split,
                    min_samples_leaf: params.min_samples_leaf,
                    max_features: params.max_features,
                    seed,
                });

                if params.bootstrap {
                    let indices = bootstrap_indices(n_samples, seed);
                    tree.fit_indices(dataset, &indices);
                } else {
                    tree.fit(dataset);
                }

                tree
            })
            .collect();

        self.trees = trees;

        // Average per-tree importances over trees that split at least once
        self.feature_importances = vec![0.0; n_features];
        let split_trees: Vec<&RegressionTree> =
            self.trees.iter().filter(|t| t.has_splits()).collect();
        for tree in &split_trees {
            for (total, &imp) in self
                .feature_importances
                .iter_mut()
                .zip(tree.feature_importances())
            {
                *total += imp;
            }
        }

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }

        Ok(())
    }

    /// Predict for a single sample (mean of tree predictions)
    pub fn predict_one(&self, features: &[f64]) -> Result<f64> {
        if self.trees.is_empty() {
            return Err(PipelineError::NotFitted);
        }
        if features.len() != self.feature_names.len() {
            return Err(PipelineError::FeatureMismatch {
                expected: self.feature_names.len(),
                actual: features.len(),
            });
        }

        let total: f64 = self.trees.iter().map(|t| t.predict_one(features)).sum();
        Ok(total / self.trees.len() as f64)
    }

    /// Predict for multiple samples
    pub fn predict(&self, rows: &[Vec<f64>]) -> Result<Vec<f64>> {
        rows.par_iter().map(|row| self.predict_one(row)).collect()
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Get feature names with importances, sorted by importance descending
    pub fn feature_importance_ranking(&self) -> Vec<(&str, f64)> {
        let mut ranking: Vec<(&str, f64)> = self
            .feature_names
            .iter()
            .zip(self.feature_importances.iter())
            .map(|(n, &i)| (n.as_str(), i))
            .collect();

        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    pub fn params(&self) -> &ForestParams {
        &self.params
    }

    /// Number of trees
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn mean_depth(&self) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        self.trees.iter().map(|t| t.depth() as f64).sum::<f64>() / self.trees.len() as f64
    }
}

/// `n` row indices drawn with replacement
fn bootstrap_indices(n: usize, seed: u64) -> Vec<usize> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    (0..n).map(|_| rng.gen_range(0..n)).collect()
}
