//! Configuration file schema for bundle-cache
//!
//! Configuration is stored at `~/.config/bundle-cache/config.toml`. Every
//! field is optional; flags and environment variables take precedence.

use serde::Deserialize;
use std::path::PathBuf;

/// Root configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    /// Object store settings
    pub s3: S3Config,

    /// Cache naming and staging
    pub cache: CacheConfig,
}

/// Object store settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct S3Config {
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    pub bucket: Option<String>,

    /// Region used to sign requests
    pub region: Option<String>,

    /// `https://host` of an S3-compatible service, or a local directory
    pub endpoint: Option<String>,
}

/// Cache naming and staging settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Archive name prefix (default: project directory name)
    pub prefix: Option<String>,

    /// Architecture component of the key
    pub arch: Option<String>,

    /// Where staging archives are written (default: system temp dir)
    pub staging_dir: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_deserializes_empty() {
        let config: ConfigFile = toml::from_str("").unwrap();
        assert!(config.s3.bucket.is_none());
        assert!(config.cache.prefix.is_none());
    }

    #[test]
    fn config_deserializes_partial() {
        let toml = r#"
            [s3]
            bucket = "ci-bundles"
            endpoint = "http://localhost:9000"

            [cache]
            staging_dir = "/var/tmp"
        "#;
        let config: ConfigFile = toml::from_str(toml).unwrap();
        assert_eq!(config.s3.bucket.as_deref(), Some("ci-bundles"));
        assert_eq!(config.s3.endpoint.as_deref(), Some("http://localhost:9000"));
        assert!(config.s3.access_key.is_none());
        assert_eq!(config.cache.staging_dir, Some(PathBuf::from("/var/tmp")));
    }
}
