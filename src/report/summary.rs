//! Run summary table printed at the end of a run

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, Color, Table};
use console::style;

use crate::model::ForestParams;
use crate::pipeline::Metrics;

/// Summary of one pipeline run
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub clean_rows: usize,
    pub train_rows: usize,
    pub test_rows: usize,
    pub params: ForestParams,
    pub best_cv_score: Option<f64>,
    pub metrics: Metrics,
    /// Top features by importance, descending
    pub top_features: Vec<(String, f64)>,
    pub prediction: f64,
}

impl RunSummary {
    /// Build the comfy-table rendering without printing it
    pub fn table(&self) -> Table {
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![Cell::new("📁 Clean Rows"), Cell::new(self.clean_rows)]);
        table.add_row(vec![
            Cell::new("✂️  Train / Test"),
            Cell::new(format!("{} / {}", self.train_rows, self.test_rows)),
        ]);
        table.add_row(vec![
            Cell::new("🌲 Trees"),
            Cell::new(self.params.n_estimators),
        ]);
        table.add_row(vec![
            Cell::new("📏 Max Depth"),
            Cell::new(
                self.params
                    .max_depth
                    .map(|d| d.to_string())
                    .unwrap_or_else(|| "None".to_string()),
            ),
        ]);
        table.add_row(vec![
            Cell::new("🍂 Min Split / Leaf"),
            Cell::new(format!(
                "{} / {}",
                self.params.min_samples_split, self.params.min_samples_leaf
            )),
        ]);

        if let Some(score) = self.best_cv_score {
            table.add_row(vec![
                Cell::new("🔍 Best CV R²"),
                Cell::new(format!("{:.4}", score)).fg(Color::Cyan),
            ]);
        }

        let r2_color = if self.metrics.r2 > 0.8 {
            Color::Green
        } else if self.metrics.r2 > 0.5 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📈 R²"),
            Cell::new(format!("{:.4}", self.metrics.r2))
                .fg(r2_color)
                .add_attribute(Attribute::Bold),
        ]);
        table.add_row(vec![
            Cell::new("📉 MAE"),
            Cell::new(format!("{:.4}", self.metrics.mae)),
        ]);
        table.add_row(vec![
            Cell::new("📉 RMSE"),
            Cell::new(format!("{:.4}", self.metrics.rmse)),
        ]);
        table.add_row(vec![
            Cell::new("🎯 Predicted YS"),
            Cell::new(format!("{:.2} MPa", self.prediction))
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("RUN SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        // Indent the table
        for line in self.table().to_string().lines() {
            println!("    {}", line);
        }

        if !self.top_features.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("📝").cyan(),
                style("TOP FEATURES").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            println!();
            for (name, importance) in &self.top_features {
                println!(
                    "        {} {:<16} {}",
                    style("•").dim(),
                    name,
                    style(format!("{:.4}", importance)).yellow()
                );
            }
        }
    }
}
