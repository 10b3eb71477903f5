// UI module for consistent terminal output with progress bars and styling
//
// This module provides uv/pnpm-style terminal output with spinners and progress bars.

#![allow(clippy::print_stdout, clippy::print_stderr)]

use crate::download::{DownloadTask, ProgressSink};
use crate::session::ProgressFactory;
use console::{Term, style};
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::time::Duration;

/// Spinner style similar to uv/pnpm
const SPINNER_CHARS: &str = "⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏";

/// Check if stderr is a TTY (for interactive output)
fn is_tty() -> bool {
    Term::stderr().is_term()
}

/// Create a styled spinner for async operations
pub fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    if !is_tty() {
        // Messages are printed directly when finishing instead
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars(SPINNER_CHARS)
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(message.to_string());

    if is_tty() {
        pb.enable_steady_tick(Duration::from_millis(80));
    }

    pb
}

/// Create a progress bar for downloads with size
pub fn download_bar(total_size: u64) -> ProgressBar {
    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.cyan} {msg} [{bar:25.cyan/dim}] {bytes}/{total_bytes} ({bytes_per_sec})",
            )
            .unwrap()
            .tick_chars(SPINNER_CHARS)
            .progress_chars("━━╺"),
    );
    pb
}

/// One byte bar per download task, stacked in a shared multi-progress.
pub struct DownloadBars {
    multi: MultiProgress,
}

impl DownloadBars {
    pub fn new() -> Self {
        let multi = MultiProgress::new();
        if !is_tty() {
            multi.set_draw_target(ProgressDrawTarget::hidden());
        }
        Self { multi }
    }
}

impl Default for DownloadBars {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressFactory for DownloadBars {
    fn reporter(&self, task: &DownloadTask) -> Box<dyn ProgressSink> {
        let pb = self
            .multi
            .add(download_bar(task.expected_size.unwrap_or(0)));
        pb.set_message(format!(
            "[{}_{}] {}",
            task.product_code,
            task.version,
            task.file_name()
        ));
        Box::new(BarSink(pb))
    }
}

/// Clears its bar once the task is done with it.
struct BarSink(ProgressBar);

impl ProgressSink for BarSink {
    fn update(&self, transferred: u64, total: u64) {
        if total > 0 && self.0.length() != Some(total) {
            self.0.set_length(total);
        }
        self.0.set_position(transferred);
    }
}

impl Drop for BarSink {
    fn drop(&mut self) {
        self.0.finish_and_clear();
    }
}

/// Print a success message with checkmark
pub fn success(message: &str) {
    println!("{} {}", style("✓").green(), message);
}

/// Print an info/action message with arrow
pub fn action(message: &str) {
    println!("{} {}", style("→").cyan(), message);
}

/// Print a warning message
pub fn warning(message: &str) {
    eprintln!("{} {}", style("⚠").yellow(), message);
}

/// Print an error message
pub fn error(message: &str) {
    eprintln!("{} {}", style("✗").red(), message);
}

/// Print a header/section message
pub fn header(message: &str) {
    println!("{}", style(message).bold());
}

/// Print a dimmed/secondary message
pub fn dim(message: &str) {
    println!("{}", style(message).dim());
}

/// Print an aligned key/value line
pub fn status(prefix: &str, message: &str) {
    println!("{} {}", style(prefix).cyan().bold(), message);
}

/// Finish a spinner with success
pub fn finish_spinner_success(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✓").green(), message);
    if is_tty() {
        pb.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        println!("{}", msg);
    }
}

/// Finish a spinner with error
pub fn finish_spinner_error(pb: &ProgressBar, message: &str) {
    let msg = format!("{} {}", style("✗").red(), message);
    if is_tty() {
        pb.set_style(ProgressStyle::default_spinner().template("{msg}").unwrap());
        pb.finish_with_message(msg);
    } else {
        pb.finish_and_clear();
        eprintln!("{}", msg);
    }
}
