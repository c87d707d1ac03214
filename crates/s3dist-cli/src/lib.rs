//! s3dist - browse and fetch releases stored in an object store bucket.
//!
//! Objects laid out as `<prefix>/<channel>/<tag>/<filename>` are grouped
//! into releases. The CLI lists them, prints the public URL an asset
//! redirects to, or proxies an asset's bytes to a file.

pub mod cmd;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use s3dist_core::{Backend, LocalBackend, LocalConfig, S3Backend, S3Config};

/// Command line interface.
#[derive(Debug, Parser)]
#[command(name = "s3dist")]
#[command(author, version, about = "s3dist - releases from an object store bucket")]
pub struct Cli {
    /// Where releases are stored
    #[command(flatten)]
    pub backend: BackendArgs,

    /// Subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List discovered releases
    List {
        /// Only show releases on this channel
        #[arg(long)]
        channel: Option<String>,
        /// Print the catalog as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print the URL an asset download redirects to
    Url {
        /// Release tag (e.g. 1.2.0)
        tag: String,
        /// Asset file name
        asset: String,
    },
    /// Download an asset through this process
    Fetch {
        /// Release tag (e.g. 1.2.0)
        tag: String,
        /// Asset file name
        asset: String,
        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

/// Backend variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BackendKind {
    /// S3 bucket
    S3,
    /// Local directory
    Local,
}

/// Options selecting and configuring the backend.
#[derive(Debug, Args)]
pub struct BackendArgs {
    /// Backend to read releases from
    #[arg(
        long,
        global = true,
        value_enum,
        default_value_t = BackendKind::S3,
        env = "S3DIST_BACKEND"
    )]
    pub backend: BackendKind,

    /// Only consider keys under this prefix
    #[arg(long, global = true, env = "S3DIST_PREFIX")]
    pub prefix: Option<String>,

    /// Access key id
    #[arg(long, global = true, env = "S3DIST_KEY", hide_env_values = true)]
    pub key: Option<String>,

    /// Secret access key
    #[arg(long, global = true, env = "S3DIST_SECRET", hide_env_values = true)]
    pub secret: Option<String>,

    /// Bucket name
    #[arg(long, global = true, env = "S3DIST_BUCKET")]
    pub bucket: Option<String>,

    /// Bucket region (also used in public asset URLs)
    #[arg(
        long,
        global = true,
        env = "S3DIST_REGION",
        default_value = s3dist_core::config::DEFAULT_REGION
    )]
    pub region: String,

    /// S3-compatible API endpoint
    #[arg(long, global = true, env = "S3DIST_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Repository directory (local backend)
    #[arg(long, global = true, env = "S3DIST_ROOT")]
    pub root: Option<PathBuf>,

    /// Base URL the repository directory is published under (local backend)
    #[arg(long, global = true, env = "S3DIST_BASE_URL")]
    pub base_url: Option<String>,
}

impl BackendArgs {
    /// Build the S3 configuration. Missing values surface as empty options
    /// and are rejected by validation.
    pub fn s3_config(&self) -> S3Config {
        let mut config = S3Config::new(
            self.key.clone().unwrap_or_default(),
            self.secret.clone().unwrap_or_default(),
            self.bucket.clone().unwrap_or_default(),
        )
        .with_region(&self.region);
        config.prefix.clone_from(&self.prefix);
        config.endpoint.clone_from(&self.endpoint);
        config
    }

    /// Build the local configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if `--root` is missing.
    pub fn local_config(&self) -> Result<LocalConfig> {
        let root = self
            .root
            .clone()
            .context("the local backend requires --root (or S3DIST_ROOT)")?;
        let mut config = LocalConfig::new(root, self.base_url.clone().unwrap_or_default());
        config.prefix.clone_from(&self.prefix);
        Ok(config)
    }

    /// Construct the selected backend.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is incomplete.
    pub fn build(&self) -> Result<Box<dyn Backend>> {
        let backend: Box<dyn Backend> = match self.backend {
            BackendKind::S3 => Box::new(
                S3Backend::new(self.s3_config()).context("Invalid S3 backend configuration")?,
            ),
            BackendKind::Local => Box::new(
                LocalBackend::new(self.local_config()?)
                    .context("Invalid local backend configuration")?,
            ),
        };
        Ok(backend)
    }
}
