//! Progress bar styling and duration formatting for batch runs

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub fn pb_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-")
}

/// A styled bar of `len` steps.
pub fn progress_bar(len: usize) -> ProgressBar {
    ProgressBar::new(len as u64).with_style(pb_style())
}

/// `HH:MM:SS` with leading zero components dropped, e.g. `01:05` for 65s.
pub fn readable_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let parts = [secs / 3600, (secs % 3600) / 60, secs % 60];
    let first = parts.iter().position(|&p| p != 0).unwrap_or(2);
    parts[first..]
        .iter()
        .map(|p| format!("{:02}", p))
        .collect::<Vec<_>>()
        .join(":")
}
