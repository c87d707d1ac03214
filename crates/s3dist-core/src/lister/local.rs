//! Lister over a local directory tree.
//!
//! Every regular file is reported as one object whose key is its path
//! relative to the root, `/`-separated. The whole tree is a single batch.

use std::fs::File;
use std::path::Path;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use sha2::{Digest, Sha256};
use walkdir::WalkDir;

use super::{BatchStream, ObjectLister};
use crate::config::LocalConfig;
use crate::error::{ConfigError, ListingError};
use crate::types::ObjectMeta;

/// Walks `root` on a blocking thread and reports its files.
#[derive(Debug, Clone)]
pub struct LocalLister {
    config: LocalConfig,
}

impl LocalLister {
    /// Create a lister for `config.root`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the root is not a directory or no public
    /// base URL is set.
    pub fn new(config: LocalConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// The configuration this lister was built from.
    pub fn config(&self) -> &LocalConfig {
        &self.config
    }
}

impl ObjectLister for LocalLister {
    fn list(&self, prefix: Option<&str>) -> BatchStream {
        let root = self.config.root.clone();
        let prefix = prefix.map(str::to_string);

        stream::once(async move {
            let walk_root = root.clone();
            tokio::task::spawn_blocking(move || walk(&walk_root, prefix.as_deref()))
                .await
                .map_err(|e| ListingError::walk(root, e))?
        })
        .boxed()
    }

    fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }
}

fn walk(root: &Path, prefix: Option<&str>) -> Result<Vec<ObjectMeta>, ListingError> {
    let mut objects = Vec::new();

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|e| ListingError::walk(root, e))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(root) else {
            continue;
        };

        let key = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        if prefix.is_some_and(|p| !key.starts_with(p)) {
            continue;
        }

        let metadata = entry.metadata().map_err(|e| ListingError::walk(root, e))?;
        let last_modified = metadata
            .modified()
            .map(DateTime::<Utc>::from)
            .unwrap_or_default();

        objects.push(ObjectMeta {
            checksum: sha256_file(entry.path()).map_err(|e| ListingError::walk(root, e))?,
            key,
            size: metadata.len(),
            last_modified,
        });
    }

    tracing::debug!("Walked {} files under {}", objects.len(), root.display());
    Ok(objects)
}

fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex::encode(hasher.finalize()))
}
