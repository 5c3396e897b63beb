//! Terminal output with CI fallback
//!
//! Spinners and progress bars on interactive terminals (`cliclack`,
//! `indicatif`), plain line-oriented output in CI logs.
//!
//! # Example
//!
//! ```rust,ignore
//! use bundle_cache::ui::{self, UiContext, TaskSpinner};
//!
//! let ctx = UiContext::detect();
//! ui::heading(&ctx, "Upload bundle");
//!
//! let mut spinner = TaskSpinner::new(&ctx);
//! spinner.start("Archiving...");
//! // ... do work ...
//! spinner.stop("Archived .bundle");
//! ```

mod context;
mod output;
mod progress;

pub use context::UiContext;
pub use output::{bundle_state, field, format_bytes, heading, report_outcome, summary};
pub use progress::{TaskSpinner, TransferProgress};
