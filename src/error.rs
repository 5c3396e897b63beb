//! Error types for bundle-cache
//!
//! All modules use `CacheResult<T>` as their return type. Every error is
//! terminal: `main` prints it and exits with [`CacheError::exit_code`].

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for bundle-cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// Process exit statuses, stable for scripting
pub mod exit_code {
    /// Success, including the "already cached" no-op
    pub const SUCCESS: u8 = 0;
    /// Archive, transfer or extraction failure
    pub const FAILURE: u8 = 1;
    /// Unknown or missing command
    pub const WRONG_USAGE: u8 = 2;
    /// Access key, secret key or bucket missing
    pub const NO_CREDENTIALS: u8 = 3;
    /// Nothing to upload
    pub const NO_BUNDLE: u8 = 4;
    /// Download refused, bundle directory already present
    pub const BUNDLE_EXISTS: u8 = 5;
    /// Lockfile not found
    pub const NO_LOCKFILE: u8 = 6;
}

/// Sub-steps of unpacking a downloaded archive into the bundle directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExtractStep {
    CreateDir,
    Move,
    Unpack,
    RemoveArchive,
}

impl fmt::Display for ExtractStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let step = match self {
            Self::CreateDir => "create bundle directory",
            Self::Move => "move archive",
            Self::Unpack => "extract archive",
            Self::RemoveArchive => "remove archive",
        };
        write!(f, "{}", step)
    }
}

/// All errors that can occur in bundle-cache
#[derive(Error, Debug)]
pub enum CacheError {
    // Configuration errors
    #[error("Please provide S3 {0}")]
    MissingCredential(&'static str),

    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Invalid S3 endpoint {endpoint}: {reason}")]
    EndpointInvalid { endpoint: String, reason: String },

    // Precondition errors
    #[error("Lockfile does not exist: {}", .0.display())]
    LockfileMissing(PathBuf),

    #[error("Unable to read lockfile {}: {source}", .path.display())]
    LockfileUnreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Bundle path does not exist: {}", .0.display())]
    NoBundle(PathBuf),

    #[error("Bundle path already exists: {}", .0.display())]
    BundleExists(PathBuf),

    #[error("Bundle directory already exists: {}", .0.display())]
    DirectoryAlreadyExists(PathBuf),

    #[error("Failed to remove existing archive {}: {source}", .path.display())]
    StaleArchive {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // Tool errors
    #[error("Failed to make archive of {}: {reason}", .path.display())]
    ArchiveBuildFailed { path: PathBuf, reason: String },

    #[error("Unable to {step}: {reason}")]
    ExtractFailed { step: ExtractStep, reason: String },

    // Transfer errors
    #[error("Transfer failed for {location}: {reason}")]
    TransferFailed { location: String, reason: String },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Create a transfer error for a location
    pub fn transfer(location: impl fmt::Display, reason: impl fmt::Display) -> Self {
        Self::TransferFailed {
            location: location.to_string(),
            reason: reason.to_string(),
        }
    }

    /// Create an extraction error for one of the unpack sub-steps
    pub fn extract(step: ExtractStep, reason: impl fmt::Display) -> Self {
        Self::ExtractFailed {
            step,
            reason: reason.to_string(),
        }
    }

    /// Exit status reported to the shell for this error
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::MissingCredential(_) => exit_code::NO_CREDENTIALS,
            Self::LockfileMissing(_) => exit_code::NO_LOCKFILE,
            Self::NoBundle(_) => exit_code::NO_BUNDLE,
            Self::BundleExists(_) | Self::DirectoryAlreadyExists(_) => exit_code::BUNDLE_EXISTS,
            _ => exit_code::FAILURE,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingCredential("access key") => {
                Some("Pass --access-key or set S3_ACCESS_KEY")
            }
            Self::MissingCredential("secret key") => {
                Some("Pass --secret-key or set S3_SECRET_KEY")
            }
            Self::MissingCredential(_) => Some("Pass --bucket or set S3_BUCKET"),
            Self::EndpointInvalid { .. } => {
                Some("Use scheme://host[:port] for --endpoint and pass the bucket with --bucket")
            }
            Self::LockfileMissing(_) => Some("Run `bundle lock` or pass --path"),
            Self::BundleExists(_) => Some("Remove the .bundle directory to restore from cache"),
            Self::NoBundle(_) => Some("Run `bundle install --path .bundle` first"),
            _ => None,
        }
    }
}
