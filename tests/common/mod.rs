//! Shared test utilities and fixture generators

#![allow(dead_code)]

use polars::prelude::*;
use rand::prelude::*;
use rand::rngs::StdRng;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use ysforest::config::{PipelineConfig, FEATURE_COLS, TARGET_COL};
use ysforest::model::ForestParams;
use ysforest::utils::Logger;

pub const HEADER: &str = "P(W),V(mm/s),H(um),T(um),Density(%),Hardness(HRA),E(MPa),UTS(MPa),EL(%),YS(MPa),Quality";

/// One synthetic row of printing parameters and mechanical properties.
///
/// Yield strength is mostly driven by UTS and hardness, plus a little noise.
fn materials_row(rng: &mut StdRng) -> Vec<f64> {
    let power = rng.gen_range(120.0..200.0);
    let speed = rng.gen_range(400.0..900.0);
    let hatch = rng.gen_range(80.0..120.0);
    let layer = rng.gen_range(20.0..40.0);
    let density = rng.gen_range(94.0..99.9);
    let hardness = rng.gen_range(45.0..65.0);
    let modulus = rng.gen_range(15000.0..18000.0);
    let uts = rng.gen_range(450.0..650.0);
    let elongation = rng.gen_range(10.0..40.0);
    let ys = 0.7 * uts + 1.5 * hardness + 0.2 * density + rng.gen_range(-5.0..5.0);

    vec![
        power, speed, hatch, layer, density, hardness, modulus, uts, elongation, ys,
    ]
}

/// Raw materials CSV text with `rows` clean rows, followed by one row with a
/// missing value and one with a non-numeric value.
pub fn materials_csv(rows: usize, seed: u64) -> String {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut lines = vec![HEADER.to_string()];

    for i in 0..rows {
        let values: Vec<String> = materials_row(&mut rng)
            .iter()
            .map(|v| format!("{:.3}", v))
            .collect();
        let quality = if i % 3 == 0 { "good" } else { "fair" };
        lines.push(format!("{},{}", values.join(","), quality));
    }

    // Missing hardness
    lines.push("150.0,500.0,100.0,30.0,97.0,,16000.0,550.0,25.0,430.0,good".to_string());
    // Unparseable UTS
    lines.push("150.0,500.0,100.0,30.0,97.0,55.0,16000.0,n/a,25.0,430.0,fair".to_string());

    lines.join("\n") + "\n"
}

/// Write the synthetic raw CSV into `dir` and return its path
pub fn write_materials_csv(dir: &Path, rows: usize, seed: u64) -> PathBuf {
    let raw_dir = dir.join("raw");
    std::fs::create_dir_all(&raw_dir).unwrap();
    let path = raw_dir.join("materials.csv");
    std::fs::write(&path, materials_csv(rows, seed)).unwrap();
    path
}

/// Temp workspace holding a raw CSV, plus a config pointing every output into it
pub fn create_workspace(rows: usize) -> (TempDir, PipelineConfig) {
    let temp_dir = TempDir::new().unwrap();
    let raw = write_materials_csv(temp_dir.path(), rows, 7);

    let config = PipelineConfig {
        raw_data: raw,
        processed_data: temp_dir.path().join("processed").join("materials_processed.csv"),
        vis_dir: temp_dir.path().join("visualizations"),
        forest: ForestParams {
            n_estimators: 20,
            ..Default::default()
        },
        ..Default::default()
    };

    (temp_dir, config)
}

/// Clean numeric DataFrame with the real feature and target columns
pub fn create_materials_dataframe(rows: usize, seed: u64) -> DataFrame {
    let mut rng = StdRng::seed_from_u64(seed);
    let data: Vec<Vec<f64>> = (0..rows).map(|_| materials_row(&mut rng)).collect();

    let mut columns: Vec<Column> = FEATURE_COLS
        .iter()
        .enumerate()
        .map(|(j, name)| Column::new((*name).into(), data.iter().map(|r| r[j]).collect::<Vec<f64>>()))
        .collect();
    columns.push(Column::new(
        TARGET_COL.into(),
        data.iter().map(|r| r[9]).collect::<Vec<f64>>(),
    ));

    DataFrame::new(columns).unwrap()
}

pub fn feature_names() -> Vec<String> {
    FEATURE_COLS.iter().map(|s| s.to_string()).collect()
}

/// Logger that writes nothing to the console and keeps no file
pub fn quiet_logger() -> Logger {
    Logger::console_only().quiet()
}
