//! Feature matrix / target vector view of a cleaned dataset, plus splitting

use polars::prelude::*;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use crate::error::{PipelineError, Result};

/// Dataset for regression with features and targets
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// Feature matrix (n_samples x n_features)
    pub features: Vec<Vec<f64>>,
    /// Target values
    pub targets: Vec<f64>,
    /// Feature names, in column order
    pub feature_names: Vec<String>,
    pub target_name: String,
}

/// Train/test split result
#[derive(Debug, Clone)]
pub struct Split {
    pub train: Dataset,
    pub test: Dataset,
    /// Row indices (into the source dataset) that went to each side
    pub train_indices: Vec<usize>,
    pub test_indices: Vec<usize>,
}

/// One cross-validation fold: rows to fit on and rows to score on
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<usize>,
    pub validation: Vec<usize>,
}

impl Dataset {
    /// Create dataset from raw rows
    pub fn from_data(
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
        feature_names: Vec<String>,
        target_name: impl Into<String>,
    ) -> Self {
        Self {
            features,
            targets,
            feature_names,
            target_name: target_name.into(),
        }
    }

    /// Extract the configured feature and target columns from a cleaned DataFrame.
    ///
    /// Columns are cast to Float64; any remaining null or non-finite value is an error
    /// because the preprocessor is supposed to have removed them.
    pub fn from_frame(df: &DataFrame, feature_cols: &[String], target_col: &str) -> Result<Self> {
        let available: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        for column in feature_cols
            .iter()
            .map(String::as_str)
            .chain(std::iter::once(target_col))
        {
            if !available.iter().any(|c| c == column) {
                return Err(PipelineError::MissingColumn {
                    column: column.to_string(),
                    available,
                });
            }
        }

        if df.height() == 0 {
            return Err(PipelineError::EmptyDataset(
                "no rows left after preprocessing".to_string(),
            ));
        }

        let columns = feature_cols
            .iter()
            .map(|name| column_values(df, name))
            .collect::<Result<Vec<_>>>()?;
        let targets = column_values(df, target_col)?;

        let features = (0..df.height())
            .map(|row| columns.iter().map(|values| values[row]).collect())
            .collect();

        Ok(Self {
            features,
            targets,
            feature_names: feature_cols.to_vec(),
            target_name: target_col.to_string(),
        })
    }

    /// Number of samples
    pub fn n_samples(&self) -> usize {
        self.features.len()
    }

    /// Number of features
    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    /// Create a subset of the dataset by indices
    pub fn subset(&self, indices: &[usize]) -> Dataset {
        Dataset {
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
            feature_names: self.feature_names.clone(),
            target_name: self.target_name.clone(),
        }
    }

    /// Seeded random train/test split.
    ///
    /// `ceil(test_size * n)` rows go to the test side; the rest train. The partition
    /// depends only on `n`, `test_size` and `seed`.
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> Result<Split> {
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(PipelineError::InvalidConfig(format!(
                "test size must be between 0 and 1 (exclusive), got {}",
                test_size
            )));
        }

        let n = self.n_samples();
        let n_test = (test_size * n as f64).ceil() as usize;
        if n_test == 0 || n_test >= n {
            return Err(PipelineError::InvalidConfig(format!(
                "cannot split {} samples with test size {}: both sides need at least one row",
                n, test_size
            )));
        }

        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(&mut rng);

        let (test_indices, train_indices) = indices.split_at(n_test);

        Ok(Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
            train_indices: train_indices.to_vec(),
            test_indices: test_indices.to_vec(),
        })
    }
}

/// Contiguous, unshuffled k-fold partition of `n` rows.
///
/// The first `n % k` folds hold one extra row.
pub fn k_fold(n: usize, k: usize) -> Result<Vec<Fold>> {
    if k < 2 {
        return Err(PipelineError::InvalidConfig(format!(
            "cross-validation needs at least 2 folds, got {}",
            k
        )));
    }
    if k > n {
        return Err(PipelineError::InvalidConfig(format!(
            "cannot make {} folds from {} training samples",
            k, n
        )));
    }

    let base = n / k;
    let extra = n % k;
    let mut folds = Vec::with_capacity(k);
    let mut start = 0;

    for fold in 0..k {
        let size = base + usize::from(fold < extra);
        let end = start + size;
        folds.push(Fold {
            train: (0..start).chain(end..n).collect(),
            validation: (start..end).collect(),
        });
        start = end;
    }

    Ok(folds)
}

fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df.column(name)?.cast(&DataType::Float64)?;
    let values = column.f64()?;

    values
        .iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) if v.is_finite() => Ok(v),
            _ => Err(PipelineError::NonNumeric {
                column: name.to_string(),
                row,
            }),
        })
        .collect()
}
