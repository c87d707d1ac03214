//! Backend over a local directory published at a base URL.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use futures::TryStreamExt;
use tokio_util::io::ReaderStream;

use super::{AssetStream, Backend};
use crate::cache::ReleaseCache;
use crate::config::LocalConfig;
use crate::error::{ConfigError, FetchError, ListingError};
use crate::lister::LocalLister;
use crate::types::{Asset, Catalog};

/// Releases laid out on disk as `<root>/.../<channel>/<tag>/<file>`.
///
/// Redirects point at `<public_base_url>/<key>`; proxied streams read the
/// file directly.
#[derive(Debug)]
pub struct LocalBackend {
    root: PathBuf,
    cache: ReleaseCache,
}

impl LocalBackend {
    /// Create a backend for `config`.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigError`] if the root is not a directory or the base
    /// URL is empty.
    pub fn new(config: LocalConfig) -> Result<Self, ConfigError> {
        let root = config.root.clone();
        let prefix = config.prefix.clone();
        let lister = LocalLister::new(config)?;

        Ok(Self {
            root,
            cache: ReleaseCache::new(Arc::new(lister), prefix),
        })
    }

    fn resolve(&self, key: &str) -> Result<PathBuf, FetchError> {
        let relative = Path::new(key);
        if !relative
            .components()
            .all(|c| matches!(c, Component::Normal(_)))
        {
            return Err(FetchError::InvalidPath(key.to_string()));
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl Backend for LocalBackend {
    async fn releases(&self) -> Result<Arc<Catalog>, ListingError> {
        self.cache.get().await
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }

    async fn asset_stream(&self, asset: &Asset) -> Result<AssetStream, FetchError> {
        let path = self.resolve(&asset.path)?;
        let file = tokio::fs::File::open(&path).await?;
        let len = file.metadata().await?.len();
        tracing::debug!("Streaming {} ({len} bytes)", path.display());

        Ok(AssetStream::new(
            200,
            Some(len),
            ReaderStream::new(file).map_err(FetchError::from),
        ))
    }
}
