//! Model training, optionally preceded by a hyperparameter search

use crate::config::PipelineConfig;
use crate::error::Result;
use crate::model::{ForestParams, RandomForestRegressor};
use crate::pipeline::{build_pool, cross_validate_candidates, Dataset, SearchMode, SearchOutcome};
use crate::utils::{create_spinner, finish_with_success, Logger};

/// A fitted forest plus the search that chose its parameters, if one ran
#[derive(Debug, Clone)]
pub struct TrainedModel {
    pub forest: RandomForestRegressor,
    pub search: Option<SearchOutcome>,
}

/// Fit a forest on `train` according to `config.search`.
///
/// With a search, the best candidate by mean cross-validated R² is refit on the
/// whole training split.
pub fn train_model(train: &Dataset, config: &PipelineConfig, log: &Logger) -> Result<TrainedModel> {
    log.info(format!(
        "Training on {} rows x {} features",
        train.n_samples(),
        train.n_features()
    ));

    let base = config.fixed_params();
    let candidates = match config.search {
        SearchMode::None => {
            log.info(format!("Using fixed hyperparameters: {}", base));
            let forest = fit_forest(train, base, config.jobs, log)?;
            return Ok(TrainedModel {
                forest,
                search: None,
            });
        }
        SearchMode::Grid => {
            log.info(format!(
                "Starting grid search over {} candidates",
                config.grid.len()
            ));
            config.grid.candidates(&base)
        }
        SearchMode::Random => {
            if config.n_iter > config.grid.len() {
                log.warning(format!(
                    "Requested {} iterations but the grid only has {} candidates; searching all of them",
                    config.n_iter,
                    config.grid.len()
                ));
            }
            let candidates = config.grid.sample(&base, config.n_iter, config.seed);
            log.info(format!(
                "Starting randomized search over {} of {} candidates",
                candidates.len(),
                config.grid.len()
            ));
            candidates
        }
    };

    let outcome = cross_validate_candidates(&candidates, train, config.cv_folds, config.jobs, log)?;
    log.info(format!("Best parameters: {}", outcome.best_params));
    log.info(format!("Best cross-validated R²: {:.4}", outcome.best_score));

    let forest = fit_forest(train, outcome.best_params.clone(), config.jobs, log)?;

    Ok(TrainedModel {
        forest,
        search: Some(outcome),
    })
}

/// Fit one forest on the whole of `train` using `jobs` workers
pub fn fit_forest(
    train: &Dataset,
    params: ForestParams,
    jobs: usize,
    log: &Logger,
) -> Result<RandomForestRegressor> {
    let pool = build_pool(jobs)?;
    let spinner = create_spinner(
        &format!("Fitting {} trees...", params.n_estimators),
        log.is_quiet(),
    );

    let mut forest = RandomForestRegressor::new(params);
    pool.install(|| forest.fit(train))?;

    finish_with_success(&spinner, &format!("Fitted {} trees", forest.n_trees()));
    log.info(format!(
        "Fitted {} trees, mean depth {:.1}",
        forest.n_trees(),
        forest.mean_depth()
    ));

    Ok(forest)
}
