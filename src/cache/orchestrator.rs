//! Upload and download workflows
//!
//! Each run moves through
//! `Start -> KeyDerived -> PreconditionChecked -> {Skip, InProgress} -> {Done, Failed}`.
//! Preconditions are explicit checks on the local bundle state; nothing is
//! retried and nothing is rolled back on failure.
//!
//! | Bundle state | upload | download |
//! |--------------|--------|----------|
//! | missing | fails (no bundle) | proceeds |
//! | present, uncached | proceeds | fails (bundle exists) |
//! | present, cached | proceeds | skipped |
//!
//! Upload never skips on the marker: it only certifies that the bundle
//! came from the cache, not that the cached copy is current.

use crate::cache::archive::{self, StagingArchive};
use crate::cache::key::CacheKey;
use crate::cache::state::{clear_stale_archive, BundleState};
use crate::config::Settings;
use crate::error::{CacheError, CacheResult};
use crate::transport::{BlobStore, Location};
use crate::ui::{TaskSpinner, TransferProgress, UiContext};
use serde::Serialize;
use std::fmt;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Workflow phase, logged on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Start,
    KeyDerived,
    PreconditionChecked,
    Skip,
    InProgress,
    Done,
    Failed,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::KeyDerived => "key-derived",
            Self::PreconditionChecked => "precondition-checked",
            Self::Skip => "skip",
            Self::InProgress => "in-progress",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Successful result of a workflow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Archive written to the cache store
    Uploaded { location: String, bytes: u64 },
    /// Bundle restored from the cache store
    Downloaded { location: String, bytes: u64 },
    /// Bundle was already restored from cache; nothing transferred
    AlreadyCached,
}

/// Everything known once the key is derived and the local state probed
#[derive(Debug, Clone, Serialize)]
pub struct Plan {
    pub key: String,
    pub prefix: String,
    /// Hex SHA-1 of the lockfile
    pub digest: String,
    pub arch: String,
    pub object_name: String,
    pub location: String,
    pub staging: PathBuf,
    pub bundle: PathBuf,
    pub state: BundleState,
    #[serde(skip)]
    remote: Location,
}

/// Derive the key and inspect local state without changing anything
pub fn plan(settings: &Settings) -> CacheResult<Plan> {
    let key =
        CacheKey::from_lockfile(&settings.lockfile_path(), &settings.prefix, &settings.arch)?;
    let remote = settings.archive_location(&key)?;
    let state = BundleState::probe(&settings.bundle_path(), &settings.marker_path());

    Ok(Plan {
        key: key.to_string(),
        prefix: key.prefix().to_string(),
        digest: key.digest().to_string(),
        arch: key.arch().to_string(),
        object_name: key.object_name(),
        location: remote.to_string(),
        staging: settings.staging_path(&key),
        bundle: settings.bundle_path(),
        state,
        remote,
    })
}

/// Drives one upload or download
pub struct Orchestrator<'a> {
    settings: &'a Settings,
    store: &'a dyn BlobStore,
    ui: &'a UiContext,
    phase: Phase,
}

impl<'a> Orchestrator<'a> {
    pub fn new(settings: &'a Settings, store: &'a dyn BlobStore, ui: &'a UiContext) -> Self {
        Self {
            settings,
            store,
            ui,
            phase: Phase::Start,
        }
    }

    /// Current workflow phase
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Archive the bundle and store it under its cache key
    pub async fn upload(&mut self) -> CacheResult<Outcome> {
        let result = self.run_upload().await;
        self.finish(result)
    }

    /// Fetch the archive for the current lockfile and unpack it as the bundle
    pub async fn download(&mut self) -> CacheResult<Outcome> {
        let result = self.run_download().await;
        self.finish(result)
    }

    async fn run_upload(&mut self) -> CacheResult<Outcome> {
        let plan = self.prepare()?;

        if !plan.state.is_present() {
            return Err(CacheError::NoBundle(plan.bundle));
        }
        self.enter(Phase::InProgress);

        let mut spinner = TaskSpinner::new(self.ui);
        spinner.start("Archiving...");
        let built = blocking({
            let bundle = plan.bundle.clone();
            let staging = plan.staging.clone();
            move || archive::build(&bundle, &staging)
        })
        .await;
        let staged = match built {
            Ok(staged) => staged,
            Err(e) => {
                spinner.stop_error("Failed to make archive");
                return Err(e);
            }
        };
        spinner.stop(&format!("Archived {}", plan.bundle.display()));

        let bytes = self
            .transfer(
                &Location::Local(staged.path().to_path_buf()),
                &plan.remote,
                "Transferring...",
            )
            .await?;

        self.enter(Phase::Done);
        info!("Uploaded {} ({} bytes)", plan.remote, bytes);
        Ok(Outcome::Uploaded {
            location: plan.location,
            bytes,
        })
    }

    async fn run_download(&mut self) -> CacheResult<Outcome> {
        let plan = self.prepare()?;

        match plan.state {
            BundleState::PresentCached => {
                self.enter(Phase::Skip);
                return Ok(Outcome::AlreadyCached);
            }
            BundleState::PresentUncached => return Err(CacheError::BundleExists(plan.bundle)),
            BundleState::Missing => {}
        }
        self.enter(Phase::InProgress);

        let label = format!("Downloading {}...", plan.remote);
        let bytes = self
            .transfer(&plan.remote, &Location::Local(plan.staging.clone()), &label)
            .await?;

        let mut spinner = TaskSpinner::new(self.ui);
        spinner.start("Extracting...");
        let extracted = blocking({
            let staged = StagingArchive::new(&plan.staging);
            let bundle = plan.bundle.clone();
            move || archive::extract(&staged, &bundle)
        })
        .await;
        if let Err(e) = extracted {
            spinner.stop_error("Failed to extract archive");
            return Err(e);
        }
        spinner.stop(&format!("Extracted into {}", plan.bundle.display()));

        write_marker(&self.settings.marker_path())?;

        self.enter(Phase::Done);
        info!("Restored {} from {}", plan.bundle.display(), plan.remote);
        Ok(Outcome::Downloaded {
            location: plan.location,
            bytes,
        })
    }

    /// Derive the key, clear stale staging state and probe the bundle
    fn prepare(&mut self) -> CacheResult<Plan> {
        let plan = plan(self.settings)?;
        self.enter(Phase::KeyDerived);

        clear_stale_archive(&plan.staging)?;
        self.enter(Phase::PreconditionChecked);

        debug!("Key {} -> {} ({})", plan.key, plan.location, plan.state);
        Ok(plan)
    }

    async fn transfer(&self, from: &Location, to: &Location, label: &str) -> CacheResult<u64> {
        let blob = self.store.fetch(from).await?;
        let progress = TransferProgress::new(self.ui, label, blob.size);
        let result = self.store.store(to, progress.wrap(blob)).await;
        progress.finish();
        result
    }

    fn enter(&mut self, phase: Phase) {
        debug!("Phase {} -> {}", self.phase, phase);
        self.phase = phase;
    }

    fn finish(&mut self, result: CacheResult<Outcome>) -> CacheResult<Outcome> {
        if result.is_err() {
            self.enter(Phase::Failed);
        }
        result
    }
}

/// Run archive work on the blocking pool
async fn blocking<T, F>(work: F) -> CacheResult<T>
where
    F: FnOnce() -> CacheResult<T> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| CacheError::Internal(format!("archive task failed: {}", e)))?
}

/// Create the completion marker if it doesn't exist yet
fn write_marker(path: &Path) -> CacheResult<()> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(path)
        .map_err(|e| CacheError::io(format!("creating marker {}", path.display()), e))?;
    Ok(())
}
