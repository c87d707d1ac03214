//! `s3dist list`

use anyhow::{Context, Result};
use s3dist_core::{Backend, Release};

/// Print every release, optionally restricted to one channel.
///
/// # Errors
///
/// Returns an error if the catalog cannot be listed or written.
pub async fn list(backend: &dyn Backend, channel: Option<&str>, json: bool) -> Result<()> {
    let catalog = backend
        .releases()
        .await
        .context("Failed to list releases")?;

    let releases: Vec<&Release> = catalog
        .releases()
        .filter(|r| channel.is_none_or(|c| r.channel == c))
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&releases)?);
        return Ok(());
    }

    if releases.is_empty() {
        println!();
        println!("  No releases found.");
        return Ok(());
    }

    println!(
        "{:<24} {:<10} {:<12} {:>6} {:>12}",
        "RELEASE", "CHANNEL", "PUBLISHED", "ASSETS", "SIZE"
    );
    for release in &releases {
        let size: u64 = release.assets.iter().map(|a| a.size).sum();
        println!(
            "{:<24} {:<10} {:<12} {:>6} {:>12}",
            release.tag_name,
            release.channel,
            release.published_at.format("%Y-%m-%d"),
            release.assets.len(),
            size
        );
    }
    println!();
    println!("  {} releases", releases.len());

    Ok(())
}
