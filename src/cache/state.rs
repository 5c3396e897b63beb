//! Local bundle state probing
//!
//! Classifies the bundle directory before a transfer and clears any
//! staging archive left behind by an earlier run.

use crate::error::{CacheError, CacheResult};
use serde::Serialize;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// State of the bundle directory on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BundleState {
    /// No bundle directory
    Missing,
    /// Bundle directory exists but was not restored from cache
    PresentUncached,
    /// Bundle directory was populated by a successful download
    PresentCached,
}

impl BundleState {
    /// Inspect the bundle directory and its completion marker
    pub fn probe(bundle_path: &Path, marker_path: &Path) -> Self {
        let state = if !bundle_path.exists() {
            Self::Missing
        } else if marker_path.exists() {
            Self::PresentCached
        } else {
            Self::PresentUncached
        };

        debug!("Bundle {} is {}", bundle_path.display(), state);
        state
    }

    /// Whether the bundle directory exists at all
    pub fn is_present(&self) -> bool {
        !matches!(self, Self::Missing)
    }
}

impl fmt::Display for BundleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => write!(f, "missing"),
            Self::PresentUncached => write!(f, "present (uncached)"),
            Self::PresentCached => write!(f, "present (cached)"),
        }
    }
}

/// Remove a staging archive left over from a previous run
///
/// Returns `true` if a file was removed. A leftover that cannot be removed
/// is fatal, since a later write to the same path could not be trusted.
pub fn clear_stale_archive(path: &Path) -> CacheResult<bool> {
    match fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale archive {}", path.display());
            Ok(true)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(CacheError::StaleArchive {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}
