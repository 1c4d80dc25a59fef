//! CART regression tree

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::pipeline::Dataset;

/// Impurity below which a node is treated as pure.
const MIN_IMPURITY: f64 = 1e-12;

/// Regression tree configuration
#[derive(Debug, Clone, PartialEq)]
pub struct TreeParams {
    /// Maximum depth of tree (None = grow until pure or too small)
    pub max_depth: Option<usize>,
    /// Minimum samples required to split
    pub min_samples_split: usize,
    /// Minimum samples in leaf node
    pub min_samples_leaf: usize,
    /// Maximum features to consider for split (None = all)
    pub max_features: Option<usize>,
    /// Random seed for the per-split feature shuffle
    pub seed: u64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone)]
enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

impl TreeNode {
    /// Edges on the longest root-to-leaf path
    fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }

    fn n_leaves(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.n_leaves() + right.n_leaves(),
        }
    }
}

struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    /// Reduction in total squared error
    improvement: f64,
}

/// Regression tree fitted by exhaustive threshold search on squared error
#[derive(Debug, Clone)]
pub struct RegressionTree {
    params: TreeParams,
    root: Option<TreeNode>,
    n_features: usize,
    feature_importances: Vec<f64>,
}

impl RegressionTree {
    pub fn new(params: TreeParams) -> Self {
        Self {
            params,
            root: None,
            n_features: 0,
            feature_importances: Vec::new(),
        }
    }

    /// Train on every row of the dataset
    pub fn fit(&mut self, dataset: &Dataset) {
        let indices: Vec<usize> = (0..dataset.n_samples()).collect();
        self.fit_indices(dataset, &indices);
    }

    /// Train on the given rows; repeated indices count as repeated samples.
    pub fn fit_indices(&mut self, dataset: &Dataset, indices: &[usize]) {
        self.n_features = dataset.n_features();
        self.feature_importances = vec![0.0; self.n_features];

        if indices.is_empty() {
            self.root = None;
            return;
        }

        let mut rng = ChaCha8Rng::seed_from_u64(self.params.seed);
        self.root = Some(self.build_tree(dataset, indices, 0, &mut rng));

        let sum: f64 = self.feature_importances.iter().sum();
        if sum > 0.0 {
            for imp in &mut self.feature_importances {
                *imp /= sum;
            }
        }
    }

    fn build_tree(
        &mut self,
        dataset: &Dataset,
        indices: &[usize],
        depth: usize,
        rng: &mut ChaCha8Rng,
    ) -> TreeNode {
        let n = indices.len();
        let mean = indices.iter().map(|&i| dataset.targets[i]).sum::<f64>() / n as f64;
        let impurity = indices
            .iter()
            .map(|&i| (dataset.targets[i] - mean).powi(2))
            .sum::<f64>()
            / n as f64;

        let depth_reached = self.params.max_depth.is_some_and(|max| depth >= max);
        if depth_reached
            || n < self.params.min_samples_split
            || n < 2 * self.params.min_samples_leaf
            || impurity <= MIN_IMPURITY
        {
            return TreeNode::Leaf { value: mean };
        }

        let Some(split) = self.find_best_split(dataset, indices, mean, rng) else {
            return TreeNode::Leaf { value: mean };
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| dataset.features[i][split.feature_idx] <= split.threshold);

        self.feature_importances[split.feature_idx] += split.improvement;

        let left = self.build_tree(dataset, &left_indices, depth + 1, rng);
        let right = self.build_tree(dataset, &right_indices, depth + 1, rng);

        TreeNode::Split {
            feature_idx: split.feature_idx,
            threshold: split.threshold,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Sweep sorted values of each candidate feature, keeping running sums of the
    /// mean-centred targets so every threshold is scored in O(1).
    fn find_best_split(
        &self,
        dataset: &Dataset,
        indices: &[usize],
        mean: f64,
        rng: &mut ChaCha8Rng,
    ) -> Option<SplitCandidate> {
        let n = indices.len();
        let min_leaf = self.params.min_samples_leaf.max(1);

        let mut feature_indices: Vec<usize> = (0..self.n_features).collect();
        feature_indices.shuffle(rng);
        let max_features = self
            .params
            .max_features
            .unwrap_or(self.n_features)
            .clamp(1, self.n_features.max(1));
        feature_indices.truncate(max_features);

        let total_sum: f64 = indices.iter().map(|&i| dataset.targets[i] - mean).sum();
        let total_sq: f64 = indices
            .iter()
            .map(|&i| (dataset.targets[i] - mean).powi(2))
            .sum();
        let parent_sse = total_sq - total_sum * total_sum / n as f64;

        let mut best: Option<SplitCandidate> = None;
        let mut best_improvement = 0.0;
        let mut sorted: Vec<(f64, f64)> = Vec::with_capacity(n);

        for &feature_idx in &feature_indices {
            sorted.clear();
            sorted.extend(
                indices
                    .iter()
                    .map(|&i| (dataset.features[i][feature_idx], dataset.targets[i] - mean)),
            );
            sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut left_sum = 0.0;
            let mut left_sq = 0.0;

            for pos in 0..n - 1 {
                let (value, target) = sorted[pos];
                left_sum += target;
                left_sq += target * target;

                let next_value = sorted[pos + 1].0;
                if next_value <= value {
                    continue;
                }

                let n_left = pos + 1;
                let n_right = n - n_left;
                if n_left < min_leaf || n_right < min_leaf {
                    continue;
                }

                let right_sum = total_sum - left_sum;
                let right_sq = total_sq - left_sq;
                let left_sse = left_sq - left_sum * left_sum / n_left as f64;
                let right_sse = right_sq - right_sum * right_sum / n_right as f64;
                let improvement = parent_sse - left_sse - right_sse;

                if improvement > best_improvement {
                    best_improvement = improvement;
                    let mut threshold = (value + next_value) / 2.0;
                    if threshold >= next_value {
                        threshold = value;
                    }
                    best = Some(SplitCandidate {
                        feature_idx,
                        threshold,
                        improvement,
                    });
                }
            }
        }

        best
    }

    /// Predict for a single sample. Callers check the sample width.
    pub fn predict_one(&self, features: &[f64]) -> f64 {
        let mut node = match &self.root {
            Some(node) => node,
            None => return 0.0,
        };

        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature_idx,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature_idx] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    pub fn is_fitted(&self) -> bool {
        self.root.is_some()
    }

    /// Normalized impurity decrease per feature; all zeros for a single-leaf tree
    pub fn feature_importances(&self) -> &[f64] {
        &self.feature_importances
    }

    /// True when the tree made at least one split
    pub fn has_splits(&self) -> bool {
        matches!(self.root, Some(TreeNode::Split { .. }))
    }

    pub fn depth(&self) -> usize {
        self.root.as_ref().map(TreeNode::depth).unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.root.as_ref().map(TreeNode::n_leaves).unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step_dataset() -> Dataset {
        let features: Vec<Vec<f64>> = (0..40).map(|i| vec![i as f64, (i % 3) as f64]).collect();
        let targets: Vec<f64> = (0..40).map(|i| if i < 20 { 100.0 } else { 300.0 }).collect();
        Dataset::from_data(
            features,
            targets,
            vec!["x".to_string(), "noise".to_string()],
            "y",
        )
    }

    #[test]
    fn test_tree_learns_step_function() {
        let dataset = step_dataset();
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&dataset);

        assert_eq!(tree.predict_one(&[5.0, 0.0]), 100.0);
        assert_eq!(tree.predict_one(&[35.0, 2.0]), 300.0);
        assert_eq!(tree.n_leaves(), 2);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_split_feature_gets_all_importance() {
        let dataset = step_dataset();
        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&dataset);

        let importances = tree.feature_importances();
        assert!((importances[0] - 1.0).abs() < 1e-12);
        assert_eq!(importances[1], 0.0);
    }

    #[test]
    fn test_max_depth_limits_growth() {
        let features: Vec<Vec<f64>> = (0..64).map(|i| vec![i as f64]).collect();
        let targets: Vec<f64> = (0..64).map(|i| (i * i) as f64).collect();
        let dataset = Dataset::from_data(features, targets, vec!["x".to_string()], "y");

        let mut tree = RegressionTree::new(TreeParams {
            max_depth: Some(3),
            ..Default::default()
        });
        tree.fit(&dataset);

        assert_eq!(tree.depth(), 3);
        assert!(tree.n_leaves() <= 8);
    }

    #[test]
    fn test_min_samples_leaf_respected() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let mut targets = vec![0.0; 10];
        targets[9] = 1000.0;
        let dataset = Dataset::from_data(features, targets, vec!["x".to_string()], "y");

        let mut tree = RegressionTree::new(TreeParams {
            min_samples_leaf: 4,
            ..Default::default()
        });
        tree.fit(&dataset);

        // The outlier cannot be isolated, so its leaf averages at least 4 rows
        assert!(tree.predict_one(&[9.0]) < 1000.0);
    }

    #[test]
    fn test_constant_target_is_single_leaf() {
        let features: Vec<Vec<f64>> = (0..10).map(|i| vec![i as f64]).collect();
        let dataset = Dataset::from_data(features, vec![7.5; 10], vec!["x".to_string()], "y");

        let mut tree = RegressionTree::new(TreeParams::default());
        tree.fit(&dataset);

        assert!(!tree.has_splits());
        assert_eq!(tree.predict_one(&[3.0]), 7.5);
        assert!(tree.feature_importances().iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_unfitted_tree_predicts_zero() {
        let tree = RegressionTree::new(TreeParams::default());
        assert!(!tree.is_fitted());
        assert_eq!(tree.predict_one(&[1.0]), 0.0);
    }
}
