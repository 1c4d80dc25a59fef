//! PNG charts for feature importance and evaluation metrics

use std::error::Error;
use std::path::{Path, PathBuf};

use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::error::{PipelineError, Result};
use crate::pipeline::Metrics;
use crate::utils::Logger;

pub const IMPORTANCE_CHART: &str = "feature_importance.png";
pub const METRICS_CHART: &str = "evaluation_metrics.png";

const SKY_BLUE: RGBColor = RGBColor(135, 206, 235);
const ORANGE: RGBColor = RGBColor(255, 165, 0);
const GREEN: RGBColor = RGBColor(0, 128, 0);

/// Render a horizontal bar chart of `importances`, largest on top.
///
/// Writes `feature_importance.png` under `vis_dir` and returns its path.
pub fn plot_importance(
    importances: &[f64],
    names: &[String],
    vis_dir: &Path,
    log: &Logger,
) -> Result<PathBuf> {
    if importances.len() != names.len() {
        return Err(PipelineError::FeatureMismatch {
            expected: names.len(),
            actual: importances.len(),
        });
    }

    let path = prepare_output(vis_dir, IMPORTANCE_CHART)?;

    // Ascending, so the last bar drawn (top of the axis) is the largest
    let mut ranked: Vec<(&str, f64)> = names
        .iter()
        .map(String::as_str)
        .zip(importances.iter().copied())
        .collect();
    ranked.sort_by(|a, b| a.1.total_cmp(&b.1));

    render(&path, log, |p| draw_importance(p, &ranked))?;
    log.info(format!("Feature importance chart saved to {}", path.display()));
    Ok(path)
}

/// Render R², MAE and RMSE as three labelled bars.
///
/// Writes `evaluation_metrics.png` under `vis_dir` and returns its path.
pub fn plot_metrics(metrics: &Metrics, vis_dir: &Path, log: &Logger) -> Result<PathBuf> {
    let path = prepare_output(vis_dir, METRICS_CHART)?;

    render(&path, log, |p| draw_metrics(p, &metrics.entries()))?;
    log.info(format!("Evaluation metrics chart saved to {}", path.display()));
    Ok(path)
}

fn prepare_output(vis_dir: &Path, file_name: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(vis_dir).map_err(|e| PipelineError::io(vis_dir, e))?;
    Ok(vis_dir.join(file_name))
}

fn render<F>(path: &Path, log: &Logger, draw: F) -> Result<()>
where
    F: FnOnce(&Path) -> std::result::Result<(), Box<dyn Error>>,
{
    draw(path).map_err(|e| {
        let err = PipelineError::Render {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        log.error(format!("Chart rendering failed: {}", err));
        err
    })
}

fn draw_importance(path: &Path, ranked: &[(&str, f64)]) -> std::result::Result<(), Box<dyn Error>> {
    let height = 120 + 40 * ranked.len() as u32;
    let root = BitMapBackend::new(path, (1000, height.max(400))).into_drawing_area();
    root.fill(&WHITE)?;

    let max = ranked.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let x_max = if max > 0.0 { max * 1.1 } else { 1.0 };

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .caption("Feature Importance", ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..x_max, (0..ranked.len()).into_segmented())?;

    chart
        .configure_mesh()
        .disable_y_mesh()
        .x_desc("Importance")
        .y_labels(ranked.len())
        .y_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => ranked.get(*i).map(|(n, _)| n.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .axis_style(BLACK.mix(0.6))
        .light_line_style(BLACK.mix(0.06))
        .label_style(("sans-serif", 14))
        .draw()?;

    chart.draw_series(ranked.iter().enumerate().map(|(i, (_, value))| {
        let mut bar = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(i)),
                (*value, SegmentValue::Exact(i + 1)),
            ],
            SKY_BLUE.filled(),
        );
        bar.set_margin(6, 6, 0, 0);
        bar
    }))?;

    root.present()?;
    Ok(())
}

fn draw_metrics(path: &Path, entries: &[(&str, f64)]) -> std::result::Result<(), Box<dyn Error>> {
    let root = BitMapBackend::new(path, (800, 600)).into_drawing_area();
    root.fill(&WHITE)?;

    let max = entries.iter().map(|(_, v)| *v).fold(0.0, f64::max);
    let min = entries.iter().map(|(_, v)| *v).fold(0.0, f64::min);
    let y_max = if max > 0.0 { max * 1.15 } else { 1.0 };
    let y_min = if min < 0.0 { min * 1.15 } else { 0.0 };

    let mut chart = ChartBuilder::on(&root)
        .margin(12)
        .caption("Evaluation Metrics", ("sans-serif", 24))
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d((0..entries.len()).into_segmented(), y_min..y_max)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc("Value")
        .x_labels(entries.len())
        .x_label_formatter(&|v| match v {
            SegmentValue::CenterOf(i) => entries.get(*i).map(|(n, _)| n.to_string()).unwrap_or_default(),
            _ => String::new(),
        })
        .axis_style(BLACK.mix(0.6))
        .light_line_style(BLACK.mix(0.06))
        .label_style(("sans-serif", 14))
        .draw()?;

    let colors = [SKY_BLUE, ORANGE, GREEN];
    chart.draw_series(entries.iter().enumerate().map(|(i, (_, value))| {
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), *value),
            ],
            colors[i % colors.len()].filled(),
        );
        bar.set_margin(0, 0, 30, 30);
        bar
    }))?;

    chart.draw_series(entries.iter().enumerate().map(|(i, (_, value))| {
        Text::new(
            format!("{:.4}", value),
            (SegmentValue::CenterOf(i), *value),
            ("sans-serif", 16).into_font().color(&BLACK).pos(Pos::new(HPos::Center, VPos::Bottom)),
        )
    }))?;

    root.present()?;
    Ok(())
}
