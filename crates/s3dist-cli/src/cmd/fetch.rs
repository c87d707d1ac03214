//! `s3dist fetch`

use std::path::Path;

use anyhow::{Context, Result, bail};
use s3dist_core::Backend;

/// Proxy an asset's bytes into `output`, or stdout.
///
/// # Errors
///
/// Returns an error if the asset is unknown, the upstream answers with a
/// non-success status, or the bytes cannot be written.
pub async fn fetch(
    backend: &dyn Backend,
    tag: &str,
    name: &str,
    output: Option<&Path>,
) -> Result<()> {
    let asset = super::find_asset(backend, tag, name).await?;
    let stream = backend
        .asset_stream(&asset)
        .await
        .with_context(|| format!("Failed to fetch {}", asset.url))?;

    if !stream.is_success() {
        bail!("Fetching {} failed with HTTP {}", asset.url, stream.status);
    }

    let written = match output {
        Some(path) => {
            let mut file = tokio::fs::File::create(path)
                .await
                .with_context(|| format!("Failed to create {}", path.display()))?;
            stream.write_to(&mut file).await?
        }
        None => stream.write_to(&mut tokio::io::stdout()).await?,
    };

    tracing::info!("Fetched {} ({written} bytes)", asset.name);
    if let Some(path) = output {
        eprintln!("Saved {} to {}", asset.name, path.display());
    }
    Ok(())
}
