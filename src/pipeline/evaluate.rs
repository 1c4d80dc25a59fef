//! Held-out evaluation: R², MAE and RMSE

use serde::Serialize;

use crate::error::{PipelineError, Result};
use crate::model::RandomForestRegressor;
use crate::pipeline::Dataset;
use crate::utils::Logger;

/// Scalar scores of a model on the test split
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Metrics {
    pub r2: f64,
    pub mae: f64,
    pub rmse: f64,
}

impl Metrics {
    /// Label/value pairs in chart order
    pub fn entries(&self) -> [(&'static str, f64); 3] {
        [("R²", self.r2), ("MAE", self.mae), ("RMSE", self.rmse)]
    }
}

/// Score `model` on `test`. No side effects beyond logging.
pub fn evaluate(model: &RandomForestRegressor, test: &Dataset, log: &Logger) -> Result<Metrics> {
    if test.n_samples() == 0 {
        return Err(PipelineError::EmptyDataset(
            "test split has no rows to evaluate".to_string(),
        ));
    }

    let predictions = model.predict(&test.features)?;
    let metrics = Metrics {
        r2: r2_score(&test.targets, &predictions),
        mae: mean_absolute_error(&test.targets, &predictions),
        rmse: root_mean_squared_error(&test.targets, &predictions),
    };

    log.info(format!("Model accuracy (R²): {:.2}%", metrics.r2 * 100.0));
    log.info(format!(
        "Evaluation on {} test rows: R²={:.4}, MAE={:.4}, RMSE={:.4}",
        test.n_samples(),
        metrics.r2,
        metrics.mae,
        metrics.rmse
    ));

    Ok(metrics)
}

/// Coefficient of determination.
///
/// With a constant `y_true` the score is 1.0 for a perfect fit and 0.0 otherwise.
pub fn r2_score(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }

    let mean = y_true.iter().sum::<f64>() / y_true.len() as f64;
    let ss_res: f64 = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum();
    let ss_tot: f64 = y_true.iter().map(|t| (t - mean).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 {
            1.0
        } else {
            0.0
        }
    } else {
        1.0 - ss_res / ss_tot
    }
}

pub fn mean_absolute_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).abs())
        .sum::<f64>()
        / y_true.len() as f64
}

pub fn root_mean_squared_error(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let mse = y_true
        .iter()
        .zip(y_pred)
        .map(|(t, p)| (t - p).powi(2))
        .sum::<f64>()
        / y_true.len() as f64;
    mse.sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_predictions() {
        let y = [1.0, 2.0, 3.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(mean_absolute_error(&y, &y), 0.0);
        assert_eq!(root_mean_squared_error(&y, &y), 0.0);
    }

    #[test]
    fn test_known_values() {
        let y_true = [3.0, -0.5, 2.0, 7.0];
        let y_pred = [2.5, 0.0, 2.0, 8.0];

        assert!((r2_score(&y_true, &y_pred) - 0.948_608_137_044_967_9).abs() < 1e-12);
        assert!((mean_absolute_error(&y_true, &y_pred) - 0.5).abs() < 1e-12);
        assert!((root_mean_squared_error(&y_true, &y_pred) - 0.375f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_mean_prediction_scores_zero() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [2.0, 2.0, 2.0];
        assert!(r2_score(&y_true, &y_pred).abs() < 1e-12);
    }

    #[test]
    fn test_constant_target() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 6.0]), 0.0);
    }

    #[test]
    fn test_r2_can_be_negative() {
        let y_true = [1.0, 2.0, 3.0];
        let y_pred = [3.0, 2.0, 1.0];
        assert!(r2_score(&y_true, &y_pred) < 0.0);
    }
}
