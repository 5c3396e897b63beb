//! Cache key derivation from lockfile contents
//!
//! The key is `{prefix}_{sha1(lockfile)}_{arch}`. The lockfile is hashed
//! byte-for-byte, so any change to it (whitespace included) yields a new key.

use crate::error::{CacheError, CacheResult};
use sha1::{Digest, Sha1};
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use tracing::debug;

/// Extension of every archive stored in the cache
pub const ARCHIVE_EXTENSION: &str = "tar.gz";

/// Content-addressed identifier of a cached bundle
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    prefix: String,
    digest: String,
    arch: String,
}

impl CacheKey {
    /// Derive a key from raw lockfile bytes
    pub fn derive(lockfile: &[u8], prefix: &str, arch: &str) -> Self {
        let mut hasher = Sha1::new();
        hasher.update(lockfile);
        let digest = hex::encode(hasher.finalize());

        Self {
            prefix: prefix.to_string(),
            digest,
            arch: arch.to_string(),
        }
    }

    /// Read a lockfile from disk and derive its key
    pub fn from_lockfile(path: &Path, prefix: &str, arch: &str) -> CacheResult<Self> {
        let contents = fs::read(path).map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => CacheError::LockfileMissing(path.to_path_buf()),
            _ => CacheError::LockfileUnreadable {
                path: path.to_path_buf(),
                source: e,
            },
        })?;

        let key = Self::derive(&contents, prefix, arch);
        debug!("Derived cache key {} from {}", key, path.display());
        Ok(key)
    }

    /// Name prefix (project name by default)
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Hex-encoded SHA-1 of the lockfile
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Target architecture
    pub fn arch(&self) -> &str {
        &self.arch
    }

    /// Object name of the archive for this key
    pub fn object_name(&self) -> String {
        format!("{}.{}", self, ARCHIVE_EXTENSION)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.prefix, self.digest, self.arch)
    }
}

/// Architecture of the running binary, in Go's `GOARCH` naming
///
/// Keys produced by earlier releases of this tool use these names, so
/// keeping them lets old and new clients share a bucket.
pub fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "loongarch64" => "loong64",
        other => other,
    }
}
