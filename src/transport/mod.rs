//! Blob transport between the staging area and the cache store
//!
//! A [`Location`] is either an object in an S3-compatible store
//! (`http://` or `https://` URL, path-style) or a path on the local
//! filesystem. [`Transport`] dispatches each request to the matching
//! [`BlobStore`] implementation:
//!
//! - `LocalStore`: plain file I/O
//! - `S3Store`: AWS SDK with static credentials

mod local;
mod s3;

pub use local::LocalStore;
pub use s3::{S3Credentials, S3Store};

use crate::error::{CacheError, CacheResult};
use async_trait::async_trait;
use std::fmt;
use std::path::PathBuf;
use std::pin::Pin;
use tokio::io::AsyncRead;
use tracing::debug;

/// Boxed byte stream produced by [`BlobStore::fetch`]
pub type BlobReader = Pin<Box<dyn AsyncRead + Send>>;

/// A readable blob and its size, when the source knows it
pub struct Blob {
    pub reader: BlobReader,
    pub size: Option<u64>,
}

impl Blob {
    pub fn new(reader: BlobReader, size: Option<u64>) -> Self {
        Self { reader, size }
    }
}

/// Whether a location string refers to a remote object
pub fn is_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// Validate an object store endpoint, returning it without trailing slashes
pub fn check_endpoint(endpoint: &str) -> CacheResult<&str> {
    let invalid = |reason: &str| CacheError::EndpointInvalid {
        endpoint: endpoint.to_string(),
        reason: reason.to_string(),
    };

    let trimmed = endpoint.trim_end_matches('/');
    let (_, rest) = trimmed
        .split_once("://")
        .filter(|_| is_url(trimmed))
        .ok_or_else(|| invalid("expected an http:// or https:// URL"))?;
    if rest.is_empty() {
        return Err(invalid("missing host"));
    }
    if rest.contains('/') {
        return Err(invalid("endpoint must not contain a path"));
    }

    Ok(trimmed)
}

/// An object addressed by a path-style URL: `{endpoint}/{bucket}/{key}`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteObject {
    endpoint: String,
    bucket: String,
    key: String,
}

impl RemoteObject {
    /// Address `key` in `bucket` on the store at `endpoint`
    ///
    /// The endpoint must be `scheme://host[:port]`; a path after the host
    /// would be taken for the bucket by path-style addressing.
    pub fn new(endpoint: &str, bucket: &str, key: &str) -> CacheResult<Self> {
        let endpoint = check_endpoint(endpoint)?;
        if bucket.is_empty() || bucket.contains('/') {
            return Err(CacheError::EndpointInvalid {
                endpoint: endpoint.to_string(),
                reason: format!("bucket name {:?} must be a single path segment", bucket),
            });
        }
        if key.is_empty() {
            return Err(CacheError::transfer(endpoint, "empty object key"));
        }

        Ok(Self {
            endpoint: endpoint.to_string(),
            bucket: bucket.to_string(),
            key: key.to_string(),
        })
    }

    /// Scheme and host of the store
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for RemoteObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.endpoint, self.bucket, self.key)
    }
}

/// Where a blob lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// Object in an S3-compatible store
    Remote(RemoteObject),
    /// File on the local filesystem
    Local(PathBuf),
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Remote(object) => write!(f, "{}", object),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Read and write whole blobs at a [`Location`]
///
/// Implementations only accept the location kind they serve and fail
/// with `TransferFailed` otherwise.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Human-readable store name for logging
    fn name(&self) -> &'static str;

    /// Open the blob at `location` for reading
    async fn fetch(&self, location: &Location) -> CacheResult<Blob>;

    /// Write `blob` to `location`, replacing anything already there.
    /// Returns the number of bytes written.
    async fn store(&self, location: &Location, blob: Blob) -> CacheResult<u64>;
}

/// Dispatches to the local or S3 store by location kind
pub struct Transport {
    local: LocalStore,
    s3: S3Store,
}

impl Transport {
    pub fn new(s3: S3Store) -> Self {
        Self {
            local: LocalStore,
            s3,
        }
    }

    fn backend(&self, location: &Location) -> &dyn BlobStore {
        match location {
            Location::Remote(_) => &self.s3,
            Location::Local(_) => &self.local,
        }
    }
}

#[async_trait]
impl BlobStore for Transport {
    fn name(&self) -> &'static str {
        "transport"
    }

    async fn fetch(&self, location: &Location) -> CacheResult<Blob> {
        let backend = self.backend(location);
        debug!("Fetching {} via {}", location, backend.name());
        backend.fetch(location).await
    }

    async fn store(&self, location: &Location, blob: Blob) -> CacheResult<u64> {
        let backend = self.backend(location);
        debug!("Storing {} via {}", location, backend.name());
        backend.store(location, blob).await
    }
}
