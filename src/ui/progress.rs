//! Progress indicators with CI fallback

use super::context::UiContext;
use crate::transport::Blob;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

/// A task spinner with CI fallback
pub struct TaskSpinner {
    spinner: Option<cliclack::ProgressBar>,
    interactive: bool,
}

impl TaskSpinner {
    /// Create a new spinner (shows on `start` in interactive mode)
    pub fn new(ctx: &UiContext) -> Self {
        Self {
            spinner: None,
            interactive: ctx.use_fancy_output(),
        }
    }

    /// Start the spinner with a message
    pub fn start(&mut self, message: &str) {
        if self.interactive {
            let spinner = cliclack::spinner();
            spinner.start(message);
            self.spinner = Some(spinner);
        } else {
            // Plain output for CI
            println!("{} {}", style("...").dim(), message);
        }
    }

    /// Stop with success message
    pub fn stop(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.stop(message);
        } else {
            println!("{} {}", style("[OK]").green(), message);
        }
    }

    /// Stop with error message
    pub fn stop_error(&mut self, message: &str) {
        if let Some(spinner) = self.spinner.take() {
            spinner.error(message);
        } else {
            println!("{} {}", style("[FAIL]").red(), message);
        }
    }
}

/// Byte progress for a blob transfer.
///
/// Wraps the blob's reader so the bar advances as bytes are consumed.
/// Shows a bar when the size is known and a byte counter otherwise; in CI
/// it prints a single line.
pub struct TransferProgress {
    bar: Option<ProgressBar>,
}

impl TransferProgress {
    pub fn new(ctx: &UiContext, label: &str, size: Option<u64>) -> Self {
        if !ctx.use_fancy_output() {
            println!("{} {}", style("...").dim(), label);
            return Self { bar: None };
        }

        let (bar, template) = match size {
            Some(len) => (
                ProgressBar::new(len),
                "  {spinner:.cyan} {prefix}  {bar:20.cyan/dim} {bytes}/{total_bytes}  {elapsed:.dim}",
            ),
            None => (
                ProgressBar::no_length(),
                "  {spinner:.cyan} {prefix}  {bytes}  {elapsed:.dim}",
            ),
        };
        let style = ProgressStyle::default_bar()
            .template(template)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ")
            .progress_chars("━╸─");
        bar.set_style(style);
        bar.set_prefix(label.to_string());
        bar.enable_steady_tick(Duration::from_millis(120));

        Self { bar: Some(bar) }
    }

    /// Route the blob's bytes through the progress bar
    pub fn wrap(&self, blob: Blob) -> Blob {
        match self.bar {
            Some(ref bar) => Blob::new(Box::pin(bar.wrap_async_read(blob.reader)), blob.size),
            None => blob,
        }
    }

    /// Finish and clear the progress bar.
    pub fn finish(&self) {
        if let Some(ref bar) = self.bar {
            bar.disable_steady_tick();
            bar.finish_and_clear();
        }
    }
}
