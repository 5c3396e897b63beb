//! Upload command - archive the bundle and store it in the cache

use crate::cache::Orchestrator;
use crate::config::Settings;
use crate::error::CacheResult;
use crate::transport::BlobStore;
use crate::ui::{self, UiContext};

/// Execute the upload command
pub async fn execute(settings: &Settings, store: &dyn BlobStore) -> CacheResult<()> {
    let ctx = UiContext::detect();
    ui::heading(&ctx, "Upload bundle");

    let outcome = Orchestrator::new(settings, store, &ctx).upload().await?;
    ui::report_outcome(&ctx, &outcome);

    Ok(())
}
