//! Error kinds for configuration, catalog listing, and asset fetches.

use std::error::Error as StdError;
use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;

/// Underlying cause of a listing failure, shared between every caller
/// waiting on the same catalog build.
pub type Cause = Arc<dyn StdError + Send + Sync>;

/// Invalid or incomplete backend configuration. Raised at construction.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// A required option was absent or empty.
    #[error("missing required option `{0}`")]
    Missing(&'static str),

    /// The local repository root is missing or not a directory.
    #[error("root directory {} is not a directory", .0.display())]
    NotADirectory(PathBuf),
}

/// Listing the backing store failed. No partial catalog is produced.
#[derive(Error, Debug, Clone)]
pub enum ListingError {
    /// The object store rejected or failed a listing request.
    #[error("failed to list s3://{bucket}/{prefix}: {source}")]
    Store {
        /// Bucket being listed.
        bucket: String,
        /// Key prefix being listed.
        prefix: String,
        /// Store error.
        #[source]
        source: Cause,
    },

    /// Walking a local repository tree failed.
    #[error("failed to walk {}: {source}", root.display())]
    Walk {
        /// Directory being walked.
        root: PathBuf,
        /// Filesystem error.
        #[source]
        source: Cause,
    },
}

impl ListingError {
    /// Wrap an object store error for `bucket`/`prefix`.
    pub fn store(
        bucket: impl Into<String>,
        prefix: impl Into<String>,
        err: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self::Store {
            bucket: bucket.into(),
            prefix: prefix.into(),
            source: Arc::new(err),
        }
    }

    /// Wrap a filesystem error encountered under `root`.
    pub fn walk(root: impl Into<PathBuf>, err: impl StdError + Send + Sync + 'static) -> Self {
        Self::Walk {
            root: root.into(),
            source: Arc::new(err),
        }
    }
}

/// Opening or reading an asset stream failed.
///
/// HTTP error statuses are not a `FetchError`; they are reported on the
/// returned [`AssetStream`](crate::backend::AssetStream).
#[derive(Error, Debug)]
pub enum FetchError {
    /// The outbound request could not be established or its body failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Opening or reading a local file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The asset key resolves outside the local root.
    #[error("asset path {0:?} escapes the repository root")]
    InvalidPath(String),
}
