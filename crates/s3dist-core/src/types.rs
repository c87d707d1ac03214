//! Catalog data model: listed objects, assets, releases.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Serialize, Serializer};

/// Content type reported for every asset.
pub const ASSET_CONTENT_TYPE: &str = "application/octet-stream";

/// Metadata for one object reported by an [`ObjectLister`](crate::lister::ObjectLister).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectMeta {
    /// Full object key, `/`-separated.
    pub key: String,
    /// Size in bytes. Zero-sized objects are treated as directory markers.
    pub size: u64,
    /// Last modification time reported by the store.
    pub last_modified: DateTime<Utc>,
    /// Content checksum (the raw ETag for S3).
    pub checksum: String,
}

/// One downloadable file belonging to a [`Release`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Asset {
    /// Content checksum of the backing object.
    pub id: String,
    /// File name (last key segment).
    pub name: String,
    /// Size in bytes.
    pub size: u64,
    /// Always [`ASSET_CONTENT_TYPE`].
    pub content_type: String,
    /// Full object key.
    pub path: String,
    /// Public URL the asset can be fetched from.
    pub url: String,
}

/// A channel-scoped group of assets sharing one version tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Release {
    /// `<tag>-<channel>`
    pub tag_name: String,
    /// Distribution track, e.g. `stable` or `beta`.
    pub channel: String,
    /// Modification time of the object that created this release.
    pub published_at: DateTime<Utc>,
    /// Assets in the order they were listed.
    pub assets: Vec<Asset>,
}

impl Release {
    /// Look up an asset by file name.
    pub fn asset(&self, name: &str) -> Option<&Asset> {
        self.assets.iter().find(|a| a.name == name)
    }
}

/// Every release discovered under a prefix, unique by tag.
///
/// Iteration follows tag order so output is reproducible; consumers that
/// care about version order sort it themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    releases: BTreeMap<String, Release>,
}

impl Catalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of releases.
    pub fn len(&self) -> usize {
        self.releases.len()
    }

    /// Whether no release was discovered.
    pub fn is_empty(&self) -> bool {
        self.releases.is_empty()
    }

    /// Look up a release by its tag (the path segment, not `tag_name`).
    pub fn get(&self, tag: &str) -> Option<&Release> {
        self.releases.get(tag)
    }

    /// Iterate over releases.
    pub fn releases(&self) -> impl Iterator<Item = &Release> {
        self.releases.values()
    }

    /// Find an asset by release tag and file name.
    pub fn find_asset(&self, tag: &str, name: &str) -> Option<&Asset> {
        self.get(tag).and_then(|r| r.asset(name))
    }

    /// Insert a release, replacing any release already stored under `tag`.
    pub(crate) fn replace(&mut self, tag: String, release: Release) -> Option<Release> {
        self.releases.insert(tag, release)
    }
}

impl Serialize for Catalog {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.releases.values())
    }
}
