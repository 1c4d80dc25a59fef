//! ysforest: Yield Strength Prediction Library
//!
//! Cleans a materials dataset, trains a random forest regressor (optionally
//! tuned by grid or randomized search), evaluates it on a held-out split,
//! charts the results and predicts the yield strength of a new sample.

pub mod cli;
pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod report;
pub mod utils;
