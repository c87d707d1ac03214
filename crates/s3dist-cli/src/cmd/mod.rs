//! Subcommand implementations.

pub mod fetch;
pub mod list;
pub mod url;

use anyhow::{Context, Result};
use s3dist_core::{Asset, Backend};

/// Look up `tag`/`name` in the backend's catalog.
///
/// # Errors
///
/// Returns an error if listing fails or the asset does not exist.
pub async fn find_asset(backend: &dyn Backend, tag: &str, name: &str) -> Result<Asset> {
    let catalog = backend
        .releases()
        .await
        .context("Failed to list releases")?;
    let release = catalog
        .get(tag)
        .with_context(|| format!("Release '{tag}' not found"))?;
    release
        .asset(name)
        .cloned()
        .with_context(|| format!("Asset '{name}' not found in release '{}'", release.tag_name))
}
