//! Tests for the random forest regressor on materials-like data

use ysforest::config::{NEW_SAMPLE, TARGET_COL};
use ysforest::model::{ForestParams, RandomForestRegressor};
use ysforest::pipeline::{r2_score, Dataset};

#[path = "common/mod.rs"]
mod common;

use common::*;

fn materials_dataset(rows: usize, seed: u64) -> Dataset {
    let df = create_materials_dataframe(rows, seed);
    Dataset::from_frame(&df, &feature_names(), TARGET_COL).unwrap()
}

#[test]
fn test_forest_learns_signal() {
    let dataset = materials_dataset(200, 1);
    let split = dataset.train_test_split(0.2, 42).unwrap();

    let mut forest = RandomForestRegressor::new(ForestParams {
        n_estimators: 40,
        ..Default::default()
    });
    forest.fit(&split.train).unwrap();

    let predictions = forest.predict(&split.test.features).unwrap();
    let r2 = r2_score(&split.test.targets, &predictions);
    assert!(r2 > 0.5, "Forest should explain most of the variance, got R²={}", r2);
}

#[test]
fn test_uts_dominates_importance() {
    let dataset = materials_dataset(200, 2);
    let mut forest = RandomForestRegressor::new(ForestParams {
        n_estimators: 30,
        ..Default::default()
    });
    forest.fit(&dataset).unwrap();

    let ranking = forest.feature_importance_ranking();
    assert_eq!(ranking[0].0, "UTS(MPa)");
    assert!(forest.feature_importances().iter().all(|&v| v >= 0.0));
}

#[test]
fn test_same_seed_same_prediction_for_new_sample() {
    let dataset = materials_dataset(80, 3);
    let params = ForestParams {
        n_estimators: 25,
        ..Default::default()
    };

    let mut a = RandomForestRegressor::new(params.clone());
    let mut b = RandomForestRegressor::new(params);
    a.fit(&dataset).unwrap();
    b.fit(&dataset).unwrap();

    let pa = a.predict_one(&NEW_SAMPLE).unwrap();
    let pb = b.predict_one(&NEW_SAMPLE).unwrap();
    assert!(pa.is_finite());
    assert_eq!(pa, pb);
    assert_eq!(pa, a.predict_one(&NEW_SAMPLE).unwrap());
}

#[test]
fn test_prediction_within_target_range() {
    let dataset = materials_dataset(60, 4);
    let mut forest = RandomForestRegressor::new(ForestParams {
        n_estimators: 10,
        max_depth: Some(4),
        ..Default::default()
    });
    forest.fit(&dataset).unwrap();

    let min = dataset.targets.iter().copied().fold(f64::INFINITY, f64::min);
    let max = dataset.targets.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let p = forest.predict_one(&NEW_SAMPLE).unwrap();
    assert!(p >= min && p <= max, "Leaf means must stay within the target range");
}

#[test]
fn test_depth_limit_is_honoured() {
    let dataset = materials_dataset(100, 5);
    let mut forest = RandomForestRegressor::new(ForestParams {
        n_estimators: 8,
        max_depth: Some(3),
        ..Default::default()
    });
    forest.fit(&dataset).unwrap();

    assert!(forest.mean_depth() <= 3.0);
}

#[test]
fn test_fit_is_independent_of_thread_count() {
    let dataset = materials_dataset(80, 6);
    let params = ForestParams {
        n_estimators: 16,
        ..Default::default()
    };

    let single = rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap();
    let mut a = RandomForestRegressor::new(params.clone());
    single.install(|| a.fit(&dataset)).unwrap();

    let mut b = RandomForestRegressor::new(params);
    b.fit(&dataset).unwrap();

    assert_eq!(a.feature_importances(), b.feature_importances());
    assert_eq!(
        a.predict_one(&NEW_SAMPLE).unwrap(),
        b.predict_one(&NEW_SAMPLE).unwrap()
    );
}
