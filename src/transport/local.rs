//! Local filesystem blob store
//!
//! Used for the staging archive and for caches kept on a shared
//! filesystem instead of an object store.

use crate::error::{CacheError, CacheResult};
use crate::transport::{Blob, BlobStore, Location};
use async_trait::async_trait;
use std::path::Path;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

/// Blob store backed by plain files
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalStore;

impl LocalStore {
    fn path(location: &Location) -> CacheResult<&Path> {
        match location {
            Location::Local(path) => Ok(path),
            Location::Remote(_) => Err(CacheError::transfer(location, "not a local path")),
        }
    }
}

#[async_trait]
impl BlobStore for LocalStore {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn fetch(&self, location: &Location) -> CacheResult<Blob> {
        let path = Self::path(location)?;
        let file = File::open(path)
            .await
            .map_err(|e| CacheError::transfer(location, e))?;
        let size = file.metadata().await.ok().map(|m| m.len());

        Ok(Blob::new(Box::pin(file), size))
    }

    async fn store(&self, location: &Location, mut blob: Blob) -> CacheResult<u64> {
        let path = Self::path(location)?;
        let fail = |e: std::io::Error| CacheError::transfer(location, e);

        // Match object stores, where "directories" need not exist up front
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(fail)?;
        }

        let mut file = File::create(path).await.map_err(fail)?;
        let written = tokio::io::copy(&mut blob.reader, &mut file)
            .await
            .map_err(fail)?;
        file.flush().await.map_err(fail)?;
        file.sync_all().await.map_err(fail)?;

        Ok(written)
    }
}
