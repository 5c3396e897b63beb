//! CLI argument definitions using clap derive

use crate::config::Overrides;
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bundle-cache - Cache installed Ruby bundles in S3
///
/// Archives the installed-dependency directory under a key derived from
/// Gemfile.lock and restores it on any machine with the same lockfile.
#[derive(Parser, Debug)]
#[command(name = "bundle-cache")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "BUNDLE_CACHE_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(flatten)]
    pub options: CacheOptions,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Archive the bundle and upload it under the lockfile's cache key
    #[command(visible_alias = "up")]
    Upload,

    /// Download and extract the cached bundle for the current lockfile
    #[command(visible_alias = "down")]
    Download,

    /// Show the cache key, object location and local bundle state
    Info(InfoArgs),
}

/// Settings shared by every command
///
/// Each one can also come from the environment or the config file.
#[derive(Args, Debug, Default)]
pub struct CacheOptions {
    /// S3 access key
    #[arg(long, global = true, env = "S3_ACCESS_KEY", hide_env_values = true)]
    pub access_key: Option<String>,

    /// S3 secret key
    #[arg(long, global = true, env = "S3_SECRET_KEY", hide_env_values = true)]
    pub secret_key: Option<String>,

    /// S3 bucket name
    #[arg(long, global = true, env = "S3_BUCKET")]
    pub bucket: Option<String>,

    /// S3 region [default: us-east-1]
    #[arg(long, global = true, env = "S3_REGION")]
    pub region: Option<String>,

    /// S3-compatible endpoint URL, or a local directory [default: https://s3.amazonaws.com]
    #[arg(long, global = true, env = "S3_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Project directory holding Gemfile.lock and .bundle (defaults to current directory)
    #[arg(short, long, global = true, env = "BUNDLE_CACHE_PATH")]
    pub path: Option<PathBuf>,

    /// Archive name prefix (defaults to the project directory name)
    #[arg(long, global = true, env = "BUNDLE_CACHE_PREFIX")]
    pub prefix: Option<String>,

    /// Architecture component of the cache key (defaults to this host's)
    #[arg(long, global = true, env = "BUNDLE_CACHE_ARCH")]
    pub arch: Option<String>,

    /// Directory for staging archives (defaults to the system temp dir)
    #[arg(long, global = true, env = "BUNDLE_CACHE_STAGING_DIR")]
    pub staging_dir: Option<PathBuf>,
}

impl CacheOptions {
    /// Values that take precedence over the config file
    pub fn overrides(&self) -> Overrides {
        Overrides {
            access_key: self.access_key.clone(),
            secret_key: self.secret_key.clone(),
            bucket: self.bucket.clone(),
            region: self.region.clone(),
            endpoint: self.endpoint.clone(),
            path: self.path.clone(),
            prefix: self.prefix.clone(),
            arch: self.arch.clone(),
            staging_dir: self.staging_dir.clone(),
        }
    }
}

/// Arguments for the info command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Output format
    #[arg(short, long, default_value = "plain")]
    pub format: OutputFormat,
}

/// Output format for the info command
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable key/value lines
    Plain,
    /// JSON output
    Json,
}
