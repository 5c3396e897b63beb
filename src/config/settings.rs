//! Resolved, immutable run settings and the paths derived from them

use crate::cache::{host_arch, CacheKey};
use crate::config::schema::ConfigFile;
use crate::error::{CacheError, CacheResult};
use crate::transport::{check_endpoint, is_url, Location, RemoteObject, S3Credentials};
use std::path::{Path, PathBuf};

/// Endpoint used when none is configured
pub const DEFAULT_ENDPOINT: &str = "https://s3.amazonaws.com";
/// Region used when none is configured
pub const DEFAULT_REGION: &str = "us-east-1";

const BUNDLE_DIR: &str = ".bundle";
const LOCKFILE: &str = "Gemfile.lock";
const MARKER_FILE: &str = ".cache";
const FALLBACK_PREFIX: &str = "bundle";

/// Values given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,
    pub region: Option<String>,
    pub endpoint: Option<String>,
    pub path: Option<PathBuf>,
    pub prefix: Option<String>,
    pub arch: Option<String>,
    pub staging_dir: Option<PathBuf>,
}

/// Everything a run needs, resolved once
#[derive(Debug, Clone)]
pub struct Settings {
    pub access_key: String,
    pub secret_key: String,
    pub bucket: String,
    pub region: String,
    pub endpoint: String,
    /// Project directory holding the lockfile and bundle
    pub path: PathBuf,
    pub prefix: String,
    pub arch: String,
    pub staging_dir: PathBuf,
}

/// Empty values count as unset
fn pick(flag: Option<String>, file: Option<String>) -> Option<String> {
    flag.filter(|v| !v.is_empty())
        .or_else(|| file.filter(|v| !v.is_empty()))
}

fn pick_path(flag: Option<PathBuf>, file: Option<PathBuf>) -> Option<PathBuf> {
    flag.filter(|p| !p.as_os_str().is_empty())
        .or_else(|| file.filter(|p| !p.as_os_str().is_empty()))
}

impl Settings {
    /// Merge overrides over the config file and fill in defaults
    ///
    /// Credentials are checked first (access key, secret key, bucket) so a
    /// misconfigured run fails before touching the filesystem. `cwd` is the
    /// default project directory.
    pub fn resolve(overrides: Overrides, file: ConfigFile, cwd: &Path) -> CacheResult<Self> {
        let access_key = pick(overrides.access_key, file.s3.access_key)
            .ok_or(CacheError::MissingCredential("access key"))?;
        let secret_key = pick(overrides.secret_key, file.s3.secret_key)
            .ok_or(CacheError::MissingCredential("secret key"))?;
        let bucket = pick(overrides.bucket, file.s3.bucket)
            .ok_or(CacheError::MissingCredential("bucket name"))?;

        let region =
            pick(overrides.region, file.s3.region).unwrap_or_else(|| DEFAULT_REGION.to_string());
        let endpoint = pick(overrides.endpoint, file.s3.endpoint)
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());
        if is_url(&endpoint) {
            check_endpoint(&endpoint)?;
        }

        let path = overrides
            .path
            .filter(|p| !p.as_os_str().is_empty())
            .map(|p| if p.is_absolute() { p } else { cwd.join(p) })
            .unwrap_or_else(|| cwd.to_path_buf());
        let path = path.canonicalize().unwrap_or(path);

        let prefix = pick(overrides.prefix, file.cache.prefix).unwrap_or_else(|| {
            path.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| FALLBACK_PREFIX.to_string())
        });
        let arch =
            pick(overrides.arch, file.cache.arch).unwrap_or_else(|| host_arch().to_string());
        let staging_dir = pick_path(overrides.staging_dir, file.cache.staging_dir)
            .unwrap_or_else(std::env::temp_dir);

        Ok(Self {
            access_key,
            secret_key,
            bucket,
            region,
            endpoint,
            path,
            prefix,
            arch,
            staging_dir,
        })
    }

    /// Installed-dependency directory
    pub fn bundle_path(&self) -> PathBuf {
        self.path.join(BUNDLE_DIR)
    }

    /// Lockfile whose bytes seed the cache key
    pub fn lockfile_path(&self) -> PathBuf {
        self.path.join(LOCKFILE)
    }

    /// Completion marker written after a successful download
    pub fn marker_path(&self) -> PathBuf {
        self.bundle_path().join(MARKER_FILE)
    }

    /// Local staging archive for a key
    pub fn staging_path(&self, key: &CacheKey) -> PathBuf {
        self.staging_dir.join(key.object_name())
    }

    /// Where the archive for `key` lives in the cache store
    pub fn archive_location(&self, key: &CacheKey) -> CacheResult<Location> {
        let object = key.object_name();
        if is_url(&self.endpoint) {
            RemoteObject::new(&self.endpoint, &self.bucket, &object).map(Location::Remote)
        } else {
            Ok(Location::Local(
                Path::new(&self.endpoint).join(&self.bucket).join(object),
            ))
        }
    }

    /// Credentials for the object store
    pub fn credentials(&self) -> S3Credentials {
        S3Credentials::new(&self.access_key, &self.secret_key, &self.region)
    }
}
