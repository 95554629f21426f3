//! Global progress bar management.
//!
//! A single shared `MultiProgress` instance lets each scan pass attach a bar
//! without threading it through function parameters. Bars draw to stderr and
//! are hidden automatically when stderr is not a terminal.

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use once_cell::sync::Lazy;
use std::sync::Arc;

static MULTI: Lazy<Arc<MultiProgress>> = Lazy::new(|| Arc::new(MultiProgress::new()));

/// Get access to the global multi-progress bar.
pub fn global_mp() -> Arc<MultiProgress> {
    MULTI.clone()
}

/// Create a progress bar for a file-scan pass and attach it to the global
/// instance. The caller drives it with `inc` and ends it with
/// `finish_and_clear`.
pub fn scan_bar(len: u64, label: &str) -> ProgressBar {
    let style = ProgressStyle::with_template("{msg:10} [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=> ");

    let pb = ProgressBar::new(len);
    pb.set_style(style);
    pb.set_message(label.to_string());
    global_mp().add(pb.clone());
    pb
}
