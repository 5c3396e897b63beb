//! Reporting of workflow results and bundle details

use super::context::UiContext;
use crate::cache::{BundleState, Outcome};
use console::{style, Style};

const BYTE_UNITS: [&str; 4] = ["B", "KiB", "MiB", "GiB"];

/// Width of the label column in field listings
const LABEL_WIDTH: usize = 10;

/// Human-readable size of a transferred archive
pub fn format_bytes(bytes: u64) -> String {
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < BYTE_UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} B", bytes)
    } else {
        format!("{:.1} {}", value, BYTE_UNITS[unit])
    }
}

/// Title printed before a command's steps
pub fn heading(ctx: &UiContext, title: &str) {
    if ctx.use_fancy_output() {
        cliclack::intro(style(title).cyan().bold()).ok();
    } else {
        println!("{}", style(title).bold());
    }
}

/// One-line summary of a finished workflow
pub fn summary(outcome: &Outcome) -> String {
    match outcome {
        Outcome::Uploaded { location, bytes } => {
            format!("Uploaded {} to {}", format_bytes(*bytes), location)
        }
        Outcome::Downloaded { location, bytes } => {
            format!("Restored {} from {}", format_bytes(*bytes), location)
        }
        Outcome::AlreadyCached => "Bundle already restored from cache, skipping".to_string(),
    }
}

/// Report how a workflow ended; a skip is shown muted rather than as success
pub fn report_outcome(ctx: &UiContext, outcome: &Outcome) {
    let message = summary(outcome);
    let skipped = matches!(outcome, Outcome::AlreadyCached);

    if ctx.use_fancy_output() {
        let styled = if skipped {
            style(message).dim()
        } else {
            style(message).green().bold()
        };
        cliclack::outro(styled).ok();
    } else if skipped {
        println!("{} {}", style("[SKIP]").dim(), message);
    } else {
        println!("{} {}", style("[OK]").green(), message);
    }
}

/// Tag and colour for a bundle state, keyed to what `download` does with it
fn state_style(state: BundleState) -> (&'static str, Style) {
    match state {
        BundleState::Missing => ("[FETCH]", Style::new().cyan()),
        BundleState::PresentUncached => ("[BLOCKED]", Style::new().yellow()),
        BundleState::PresentCached => ("[SKIP]", Style::new().green()),
    }
}

/// Aligned `label: value` line
pub fn field(ctx: &UiContext, label: &str, value: &str) {
    let label = format!("{:<width$}", format!("{}:", label), width = LABEL_WIDTH);
    if ctx.use_fancy_output() {
        println!("  {} {}", style(label).dim(), value);
    } else {
        println!("  {} {}", label, value);
    }
}

/// Bundle state line, coloured on terminals and tagged in CI logs
pub fn bundle_state(ctx: &UiContext, state: BundleState) {
    let (tag, colour) = state_style(state);
    let label = format!("{:<width$}", "Bundle:", width = LABEL_WIDTH);
    if ctx.use_fancy_output() {
        println!("  {} {}", style(label).dim(), colour.apply_to(state));
    } else {
        println!("  {} {} {}", label, state, tag);
    }
}
