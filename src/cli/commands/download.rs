//! Download command - restore the bundle from the cache

use crate::cache::Orchestrator;
use crate::config::Settings;
use crate::error::CacheResult;
use crate::transport::BlobStore;
use crate::ui::{self, UiContext};

/// Execute the download command
pub async fn execute(settings: &Settings, store: &dyn BlobStore) -> CacheResult<()> {
    let ctx = UiContext::detect();
    ui::heading(&ctx, "Download bundle");

    let outcome = Orchestrator::new(settings, store, &ctx).download().await?;
    ui::report_outcome(&ctx, &outcome);

    Ok(())
}
