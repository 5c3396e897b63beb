//! S3-compatible blob store
//!
//! Objects are addressed path-style (`{endpoint}/{bucket}/{key}`), which
//! works for AWS S3 as well as MinIO, Backblaze B2 and other compatible
//! services. A client is built for the endpoint named by each location.
//!
//! Uploads are a single unconditional `PutObject`: concurrent writers of
//! the same key race and the last one wins.

use crate::error::{CacheError, CacheResult};
use crate::transport::{Blob, BlobStore, Location, RemoteObject};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{retry::RetryConfig, BehaviorVersion, Credentials, Region},
    error::DisplayErrorContext,
    primitives::ByteStream,
    Client,
};
use std::fmt;
use tokio::io::AsyncReadExt;
use tracing::debug;

/// Static credentials and region for the object store
#[derive(Clone)]
pub struct S3Credentials {
    access_key: String,
    secret_key: String,
    region: String,
}

impl S3Credentials {
    pub fn new(
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            access_key: access_key.into(),
            secret_key: secret_key.into(),
            region: region.into(),
        }
    }
}

impl fmt::Debug for S3Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("S3Credentials")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .finish()
    }
}

/// Blob store for objects in an S3-compatible service
#[derive(Debug, Clone)]
pub struct S3Store {
    credentials: S3Credentials,
}

impl S3Store {
    pub fn new(credentials: S3Credentials) -> Self {
        Self { credentials }
    }

    fn client_for(&self, endpoint: &str) -> Client {
        let credentials = Credentials::new(
            &self.credentials.access_key,
            &self.credentials.secret_key,
            None,
            None,
            "bundle-cache",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .credentials_provider(credentials)
            .region(Region::new(self.credentials.region.clone()))
            // 1 initial attempt + 3 retries with exponential backoff
            .retry_config(RetryConfig::standard().with_max_attempts(4))
            .force_path_style(true)
            .endpoint_url(endpoint)
            .build();
        Client::from_conf(config)
    }

    fn object(location: &Location) -> CacheResult<&RemoteObject> {
        match location {
            Location::Remote(object) => Ok(object),
            Location::Local(_) => Err(CacheError::transfer(location, "not an object store URL")),
        }
    }
}

#[async_trait]
impl BlobStore for S3Store {
    fn name(&self) -> &'static str {
        "s3"
    }

    async fn fetch(&self, location: &Location) -> CacheResult<Blob> {
        let object = Self::object(location)?;
        let output = self
            .client_for(object.endpoint())
            .get_object()
            .bucket(object.bucket())
            .key(object.key())
            .send()
            .await
            .map_err(|e| CacheError::transfer(object, DisplayErrorContext(&e)))?;

        let size = output.content_length().and_then(|n| u64::try_from(n).ok());
        debug!("Opened {} ({:?} bytes)", object, size);

        Ok(Blob::new(Box::pin(output.body.into_async_read()), size))
    }

    async fn store(&self, location: &Location, mut blob: Blob) -> CacheResult<u64> {
        let object = Self::object(location)?;

        // PutObject wants the length up front, so the blob is buffered
        let capacity = blob
            .size
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or_default();
        let mut buffer = Vec::with_capacity(capacity);
        blob.reader
            .read_to_end(&mut buffer)
            .await
            .map_err(|e| CacheError::transfer(object, e))?;
        let written = buffer.len() as u64;

        self.client_for(object.endpoint())
            .put_object()
            .bucket(object.bucket())
            .key(object.key())
            .content_length(written as i64)
            .body(ByteStream::from(buffer))
            .send()
            .await
            .map_err(|e| CacheError::transfer(object, DisplayErrorContext(&e)))?;

        debug!("Stored {} ({} bytes)", object, written);
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn store() -> S3Store {
        S3Store::new(S3Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI", "us-east-1"))
    }

    #[test]
    fn credentials_debug_redacts_secret() {
        let creds = S3Credentials::new("AKIDEXAMPLE", "wJalrXUtnFEMI", "eu-west-1");
        let debug = format!("{:?}", creds);
        assert!(debug.contains("AKIDEXAMPLE"));
        assert!(!debug.contains("wJalrXUtnFEMI"));
    }

    #[tokio::test]
    async fn rejects_local_locations() {
        let local = Location::Local(PathBuf::from("/tmp/app.tar.gz"));
        let err = store().fetch(&local).await.err().unwrap();
        assert!(matches!(err, CacheError::TransferFailed { .. }));

        let blob = Blob::new(Box::pin(&b"data"[..]), Some(4));
        let err = store().store(&local, blob).await.unwrap_err();
        assert!(matches!(err, CacheError::TransferFailed { .. }));
    }
}
