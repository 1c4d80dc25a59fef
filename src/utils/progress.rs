//! Progress bar helpers using indicatif
//!
//! Every helper takes `quiet`; a quiet run gets a hidden bar that never draws.

use indicatif::{ProgressBar, ProgressStyle};

/// Create a spinner for indeterminate progress
pub fn create_spinner(message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Create a progress bar for cross-validation fits
pub fn create_progress_bar(len: u64, message: &str, quiet: bool) -> ProgressBar {
    if quiet {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new(len);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("   {msg} [{bar:40.cyan/blue}] {pos}/{len} fits ({percent}%) [{eta}]")
            .unwrap()
            .progress_chars("=>-"),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

/// Finish a progress bar with a success message
pub fn finish_with_success(pb: &ProgressBar, message: &str) {
    pb.finish_with_message(format!("✅ {}", message));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quiet_helpers_are_hidden() {
        assert!(create_spinner("Fitting", true).is_hidden());

        let pb = create_progress_bar(10, "Cross-validating", true);
        assert!(pb.is_hidden());
        pb.inc(3);
        finish_with_success(&pb, "done");
        assert_eq!(pb.position(), 3);
    }
}
