//! End-to-end run: preprocess, split, train, evaluate, chart, report, predict

use std::path::{Path, PathBuf};

use crate::config::PipelineConfig;
use crate::error::{PipelineError, Result};
use crate::pipeline::{
    evaluate, get_column_names, train_model, DataPreprocessor, Dataset, Metrics,
};
use crate::report::{
    export_run_report, plot_importance, plot_metrics, DatasetSummary, ImportanceEntry,
    ModelSummary, PredictionEntry, RunMetadata, RunReport, RunSummary, RUN_REPORT,
};
use crate::utils::Logger;

/// Everything a finished run produced
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub metrics: Metrics,
    pub prediction: f64,
    pub importance_chart: PathBuf,
    pub metrics_chart: PathBuf,
    pub report: PathBuf,
    pub summary: RunSummary,
}

/// Run the whole pipeline for `config`, logging every stage to `log`
pub fn run(config: &PipelineConfig, log: &Logger) -> Result<RunOutcome> {
    log.info("Starting yield strength prediction pipeline");
    config.validate()?;
    log.info(format!("Random seed set to {}", config.seed));

    // Step 1: Clean (or reuse) the dataset
    let preprocessor = DataPreprocessor::from_config(config);
    check_columns(config, preprocessor.source_path())?;
    let df = preprocessor.process(log)?;
    log.info(format!("First five rows:\n{}", df.head(Some(5))));

    // Step 2: Feature matrix and target
    let dataset = Dataset::from_frame(&df, &config.feature_cols, &config.target_col)?;
    log.info(format!("Features: {}", dataset.feature_names.join(", ")));
    log.info(format!("Target: {}", dataset.target_name));

    // Step 3: Split
    let split = dataset.train_test_split(config.test_size, config.seed)?;
    log.info(format!(
        "Split {} rows into {} train / {} test",
        dataset.n_samples(),
        split.train.n_samples(),
        split.test.n_samples()
    ));

    // Step 4: Train
    let trained = train_model(&split.train, config, log)?;
    let forest = &trained.forest;

    // Step 5: Evaluate
    let metrics = evaluate(forest, &split.test, log)?;

    // Step 6: Charts
    let importance_chart = plot_importance(
        forest.feature_importances(),
        forest.feature_names(),
        &config.vis_dir,
        log,
    )?;
    let metrics_chart = plot_metrics(&metrics, &config.vis_dir, log)?;

    // Step 7: Predict the configured sample
    let prediction = forest.predict_one(&config.sample)?;
    log.info(format!("Predicted yield strength: {:.2} MPa", prediction));

    // Step 8: Run report
    let ranking: Vec<(String, f64)> = forest
        .feature_importance_ranking()
        .into_iter()
        .map(|(name, importance)| (name.to_string(), importance))
        .collect();

    let best_cv_score = trained.search.as_ref().map(|s| s.best_score);
    let report = RunReport {
        metadata: RunMetadata::from_config(config, trained.search.is_some()),
        dataset: DatasetSummary {
            clean_rows: dataset.n_samples(),
            train_rows: split.train.n_samples(),
            test_rows: split.test.n_samples(),
            features: dataset.feature_names.clone(),
            target: dataset.target_name.clone(),
        },
        model: ModelSummary {
            params: forest.params().clone(),
            best_cv_score,
            candidates_evaluated: trained.search.as_ref().map(|s| s.results.len()),
        },
        metrics,
        feature_importances: ranking
            .iter()
            .map(|(feature, importance)| ImportanceEntry {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect(),
        prediction: PredictionEntry {
            sample: config.sample.clone(),
            predicted: prediction,
        },
    };

    let report_path = config.vis_dir.join(RUN_REPORT);
    export_run_report(&report, &report_path)?;
    log.info(format!("Run report saved to {}", report_path.display()));

    let summary = RunSummary {
        clean_rows: dataset.n_samples(),
        train_rows: split.train.n_samples(),
        test_rows: split.test.n_samples(),
        params: forest.params().clone(),
        best_cv_score,
        metrics,
        top_features: ranking.into_iter().take(5).collect(),
        prediction,
    };

    log.info("Pipeline finished");

    Ok(RunOutcome {
        metrics,
        prediction,
        importance_chart,
        metrics_chart,
        report: report_path,
        summary,
    })
}

/// Fail fast when the input header lacks a configured feature or target column
fn check_columns(config: &PipelineConfig, path: &Path) -> Result<()> {
    let available = get_column_names(path)?;

    let required = config
        .feature_cols
        .iter()
        .chain(std::iter::once(&config.target_col));
    for column in required {
        if !available.contains(column) {
            return Err(PipelineError::MissingColumn {
                column: column.clone(),
                available,
            });
        }
    }

    Ok(())
}
