//! Terminal styling for the banner and configuration card

use console::{style, Emoji};
use std::path::Path;

use crate::config::PipelineConfig;

// Emoji icons with fallbacks for terminals that don't support them
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", ">> ");
pub static FOLDER: Emoji<'_, '_> = Emoji("📂 ", "");
pub static TARGET: Emoji<'_, '_> = Emoji("🎯 ", "");
pub static SAVE: Emoji<'_, '_> = Emoji("💾 ", "");
pub static TREE: Emoji<'_, '_> = Emoji("🌲 ", "");

/// Print the application banner
pub fn print_banner(version: &str) {
    println!();
    println!(
        "    {} {}",
        style("ysforest").cyan().bold(),
        style("Yield strength prediction with random forests").dim()
    );
    println!("    {}", style(format!("v{}", version)).dim());
    println!("    {}", style("━".repeat(50)).dim());
    println!();
}

/// Print configuration card
pub fn print_config(config: &PipelineConfig) {
    let box_width = 56;
    let line = "─".repeat(box_width - 2);

    println!("    ┌{}┐", line);
    println!(
        "    │ {}{}│",
        style("⚙️  Configuration").cyan().bold(),
        " ".repeat(box_width - 20)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Raw:    {:<39}│",
        FOLDER,
        truncate_path(&config.raw_data, 38)
    );
    println!(
        "    │  {} Cache:  {:<39}│",
        SAVE,
        truncate_path(&config.processed_data, 38)
    );
    println!(
        "    │  {} Target: {:<39}│",
        TARGET,
        truncate_string(&config.target_col, 38)
    );
    println!("    ├{}┤", line);
    println!(
        "    │  {} Search: {:<39}│",
        TREE,
        style(config.search.to_string()).yellow()
    );
    println!(
        "    │     Test size: {:<36}│",
        style(format!("{:.2}", config.test_size)).yellow()
    );
    println!(
        "    │     Seed:      {:<36}│",
        style(config.seed).yellow()
    );
    println!("    └{}┘", line);
    println!();
}

/// Print the final completion message
pub fn print_completion() {
    println!();
    println!(
        "    {} {}",
        ROCKET,
        style("Prediction pipeline complete!").green().bold()
    );
    println!();
}

// Helper functions

fn truncate_path(path: &Path, max_len: usize) -> String {
    let path_str = path.display().to_string();
    truncate_string(&path_str, max_len)
}

fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let tail: String = s
            .chars()
            .rev()
            .take(max_len - 3)
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect();
        format!("...{}", tail)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_strings() {
        assert_eq!(truncate_string("YS(MPa)", 38), "YS(MPa)");
    }

    #[test]
    fn test_truncate_keeps_tail() {
        let truncated = truncate_string("data/processed/materials_processed.csv", 20);
        assert_eq!(truncated.chars().count(), 20);
        assert!(truncated.starts_with("..."));
        assert!(truncated.ends_with("processed.csv"));
    }
}
