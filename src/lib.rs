//! bundle-cache - Cache installed Ruby bundles in S3
//!
//! Archives a project's installed-dependency directory, stores it under a
//! key derived from the lockfile, and restores it on later runs.

pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod transport;
pub mod ui;

pub use error::{CacheError, CacheResult};
