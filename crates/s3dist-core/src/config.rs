//! Backend configuration.
//!
//! Options can be built directly or read from `S3DIST_*` environment
//! variables. Required options are checked by `validate`, which every
//! backend constructor calls before touching the store.

use std::path::PathBuf;

use crate::error::ConfigError;

/// Region used for client setup and URL construction when none is given.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Options for an S3-backed release repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Config {
    /// Access key id.
    pub key: String,
    /// Secret access key.
    pub secret: String,
    /// Bucket holding the releases.
    pub bucket: String,
    /// Only keys under this prefix are listed.
    pub prefix: Option<String>,
    /// Store region, also used to derive public asset URLs.
    pub region: String,
    /// Alternative API endpoint for S3-compatible stores. Does not affect
    /// public asset URLs.
    pub endpoint: Option<String>,
}

impl S3Config {
    /// Create a configuration with the default region and no prefix.
    pub fn new(
        key: impl Into<String>,
        secret: impl Into<String>,
        bucket: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            secret: secret.into(),
            bucket: bucket.into(),
            prefix: None,
            region: DEFAULT_REGION.to_string(),
            endpoint: None,
        }
    }

    /// Restrict listing to keys under `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Set the store region.
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = region.into();
        self
    }

    /// Send API requests to `endpoint` instead of AWS.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Reads `S3DIST_KEY`, `S3DIST_SECRET`, `S3DIST_BUCKET`, `S3DIST_PREFIX`,
    /// `S3DIST_REGION` and `S3DIST_ENDPOINT`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if a required variable is unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.is_empty());

        let config = Self {
            key: non_empty("S3DIST_KEY").ok_or(ConfigError::Missing("key"))?,
            secret: non_empty("S3DIST_SECRET").ok_or(ConfigError::Missing("secret"))?,
            bucket: non_empty("S3DIST_BUCKET").ok_or(ConfigError::Missing("bucket"))?,
            prefix: non_empty("S3DIST_PREFIX"),
            region: non_empty("S3DIST_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            endpoint: non_empty("S3DIST_ENDPOINT"),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check that credentials and bucket are present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] naming the first empty option.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.key.is_empty() {
            return Err(ConfigError::Missing("key"));
        }
        if self.secret.is_empty() {
            return Err(ConfigError::Missing("secret"));
        }
        if self.bucket.is_empty() {
            return Err(ConfigError::Missing("bucket"));
        }
        Ok(())
    }

    /// Public URL of an object key.
    ///
    /// Format: `https://s3-<region>.amazonaws.com/<bucket>/<key>`
    pub fn public_url(&self, key: &str) -> String {
        format!(
            "https://s3-{}.amazonaws.com/{}/{}",
            self.region, self.bucket, key
        )
    }
}

/// Options for a release repository served from a local directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalConfig {
    /// Directory whose files are the repository objects.
    pub root: PathBuf,
    /// Only keys under this prefix are listed.
    pub prefix: Option<String>,
    /// Base URL the directory is published under, used for redirects.
    pub public_base_url: String,
}

impl LocalConfig {
    /// Create a configuration for `root` published at `public_base_url`.
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            prefix: None,
            public_base_url: public_base_url.into(),
        }
    }

    /// Restrict listing to keys under `prefix`.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Check that the root is a directory and a base URL is set.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] describing the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.public_base_url.is_empty() {
            return Err(ConfigError::Missing("public_base_url"));
        }
        if !self.root.is_dir() {
            return Err(ConfigError::NotADirectory(self.root.clone()));
        }
        Ok(())
    }

    /// Public URL of an object key: `<public_base_url>/<key>`.
    pub fn public_url(&self, key: &str) -> String {
        format!("{}/{key}", self.public_base_url.trim_end_matches('/'))
    }
}
