//! ysforest: Yield Strength Prediction CLI
//!
//! Trains a random forest on a materials dataset and predicts the yield
//! strength of a new sample.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::style;

use ysforest::cli::Cli;
use ysforest::pipeline::run;
use ysforest::utils::{print_banner, print_completion, print_config, Logger};

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = cli.to_config();

    let mut log = Logger::new(&cli.log_dir)
        .with_context(|| format!("Failed to open log directory {}", cli.log_dir.display()))?;
    if cli.quiet {
        log = log.quiet();
    } else {
        print_banner(env!("CARGO_PKG_VERSION"));
        print_config(&config);
    }

    let start = Instant::now();
    let outcome = match run(&config, &log) {
        Ok(outcome) => outcome,
        Err(err) => {
            log.error(format!("Pipeline failed: {}", err));
            return Err(err.into());
        }
    };

    if !cli.quiet {
        outcome.summary.display();
        println!();
        println!(
            "    {} Charts: {}, {}",
            style("✧").cyan(),
            outcome.importance_chart.display(),
            outcome.metrics_chart.display()
        );
        println!(
            "    {} Report: {}",
            style("✧").cyan(),
            outcome.report.display()
        );
        println!(
            "    {} Completed in {:.2}s",
            style("⏱").dim(),
            start.elapsed().as_secs_f64()
        );
        print_completion();
    }

    Ok(())
}
