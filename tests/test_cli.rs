//! Tests for CLI argument parsing

use clap::Parser;
use std::path::PathBuf;
use ysforest::cli::Cli;
use ysforest::config::{NEW_SAMPLE, PROCESSED_DATA, RAW_DATA};
use ysforest::pipeline::{CachePolicy, SearchMode};

#[test]
fn test_cli_default_values() {
    let cli = Cli::parse_from(["ysforest"]);

    assert_eq!(cli.input, PathBuf::from(RAW_DATA));
    assert_eq!(cli.processed, PathBuf::from(PROCESSED_DATA));
    assert_eq!(cli.vis_dir, PathBuf::from("visualizations"));
    assert_eq!(cli.log_dir, PathBuf::from("logs"));
    assert_eq!(cli.search, SearchMode::None, "Default search should be none");
    assert_eq!(cli.cv, 5);
    assert_eq!(cli.n_iter, 20);
    assert_eq!(cli.jobs, 0);
    assert_eq!(cli.test_size, 0.2);
    assert_eq!(cli.seed, 42);
    assert_eq!(cli.cache_policy, CachePolicy::Existence);
    assert!(cli.sample.is_empty());
    assert_eq!(cli.infer_schema_length, 10000);
    assert!(!cli.quiet);
}

#[test]
fn test_defaults_reproduce_constant_config() {
    let config = Cli::parse_from(["ysforest"]).to_config();

    assert_eq!(config.sample, NEW_SAMPLE.to_vec());
    assert_eq!(config.forest.n_estimators, 100);
    assert!(config.validate().is_ok());
}

#[test]
fn test_cli_search_options() {
    let cli = Cli::parse_from([
        "ysforest",
        "--search",
        "random",
        "--cv",
        "3",
        "--n-iter",
        "8",
        "--jobs",
        "2",
    ]);

    assert_eq!(cli.search, SearchMode::Random);
    let config = cli.to_config();
    assert_eq!(config.cv_folds, 3);
    assert_eq!(config.n_iter, 8);
    assert_eq!(config.jobs, 2);
}

#[test]
fn test_cli_custom_paths_and_policy() {
    let cli = Cli::parse_from([
        "ysforest",
        "-i",
        "/data/in.csv",
        "-p",
        "/data/out.csv",
        "--vis-dir",
        "/tmp/charts",
        "--cache-policy",
        "modified-time",
    ]);

    let config = cli.to_config();
    assert_eq!(config.raw_data, PathBuf::from("/data/in.csv"));
    assert_eq!(config.processed_data, PathBuf::from("/data/out.csv"));
    assert_eq!(config.vis_dir, PathBuf::from("/tmp/charts"));
    assert_eq!(config.cache_policy, CachePolicy::ModifiedTime);
}

#[test]
fn test_cli_sample_list() {
    let cli = Cli::parse_from([
        "ysforest",
        "--sample",
        "150,550,90,25,98,58,16000,580,28",
    ]);

    let config = cli.to_config();
    assert_eq!(config.sample.len(), 9);
    assert_eq!(config.sample[0], 150.0);
    assert_eq!(config.sample[8], 28.0);
}

#[test]
fn test_cli_rejects_invalid_test_size() {
    let result = Cli::try_parse_from(["ysforest", "--test-size", "1.5"]);
    assert!(result.is_err(), "Test size above 1 should be rejected");

    let result = Cli::try_parse_from(["ysforest", "--test-size", "0"]);
    assert!(result.is_err(), "Test size of 0 should be rejected");
}

#[test]
fn test_cli_rejects_unknown_search_mode() {
    let result = Cli::try_parse_from(["ysforest", "--search", "bayesian"]);
    assert!(result.is_err());
}
