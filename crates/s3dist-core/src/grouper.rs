//! Fold listed objects into a [`Catalog`] of releases.
//!
//! Keys follow `.../<channel>/<tag>/<filename>`. Objects with fewer than
//! three segments, or with size 0 (directory markers), are skipped.
//!
//! Within one listing batch every object sharing a tag lands in the same
//! release. Across batches the later batch's release for a tag *replaces*
//! the earlier one; assets are not merged. A store that splits one release
//! over two result pages therefore only keeps the assets of the last page.

use std::collections::HashMap;

use futures::{Stream, TryStreamExt, future};

use crate::error::ListingError;
use crate::types::{ASSET_CONTENT_TYPE, Asset, Catalog, ObjectMeta, Release};

/// Path components of an eligible object key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyParts<'a> {
    /// Third-to-last segment.
    pub channel: &'a str,
    /// Second-to-last segment.
    pub tag: &'a str,
    /// Last segment.
    pub filename: &'a str,
}

impl<'a> KeyParts<'a> {
    /// Split `key` into channel, tag and filename. `None` if the key has
    /// fewer than three segments.
    pub fn parse(key: &'a str) -> Option<Self> {
        let mut segments = key.rsplit('/');
        let filename = segments.next()?;
        let tag = segments.next()?;
        let channel = segments.next()?;
        Some(Self {
            channel,
            tag,
            filename,
        })
    }
}

/// Group one batch of objects into releases keyed by tag.
pub fn group_batch(
    batch: &[ObjectMeta],
    public_url: impl Fn(&str) -> String,
) -> HashMap<String, Release> {
    let mut releases: HashMap<String, Release> = HashMap::new();

    for object in batch {
        if object.size == 0 {
            continue;
        }
        let Some(parts) = KeyParts::parse(&object.key) else {
            continue;
        };

        let release = releases
            .entry(parts.tag.to_string())
            .or_insert_with(|| Release {
                tag_name: format!("{}-{}", parts.tag, parts.channel),
                channel: parts.channel.to_string(),
                published_at: object.last_modified,
                assets: Vec::new(),
            });

        release.assets.push(Asset {
            id: object.checksum.clone(),
            name: parts.filename.to_string(),
            size: object.size,
            content_type: ASSET_CONTENT_TYPE.to_string(),
            path: object.key.clone(),
            url: public_url(&object.key),
        });
    }

    releases
}

/// Merge a grouped batch into `catalog`. Tags already present are replaced.
pub fn merge_batch(catalog: &mut Catalog, releases: HashMap<String, Release>) {
    for (tag, release) in releases {
        if catalog.replace(tag, release).is_some() {
            tracing::debug!("Release replaced by a later listing batch");
        }
    }
}

/// Consume a stream of listing batches and build the catalog.
///
/// # Errors
///
/// Returns the first [`ListingError`] the stream yields; nothing built so
/// far is returned.
pub async fn build_catalog<S>(
    batches: S,
    public_url: impl Fn(&str) -> String,
) -> Result<Catalog, ListingError>
where
    S: Stream<Item = Result<Vec<ObjectMeta>, ListingError>>,
{
    let catalog = batches
        .try_fold(Catalog::new(), |mut catalog, batch| {
            merge_batch(&mut catalog, group_batch(&batch, &public_url));
            future::ready(Ok(catalog))
        })
        .await?;

    tracing::info!("Discovered {} releases", catalog.len());
    Ok(catalog)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use futures::stream;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn object(key: &str, size: u64) -> ObjectMeta {
        ObjectMeta {
            key: key.to_string(),
            size,
            last_modified: at(1_700_000_000),
            checksum: format!("etag-{key}"),
        }
    }

    fn url(key: &str) -> String {
        format!("https://s3-us-east-1.amazonaws.com/releases/{key}")
    }

    #[test]
    fn test_parse_key_parts() {
        let parts = KeyParts::parse("acme/stable/1.2.0/app.exe").unwrap();
        assert_eq!(parts.channel, "stable");
        assert_eq!(parts.tag, "1.2.0");
        assert_eq!(parts.filename, "app.exe");

        let parts = KeyParts::parse("beta/2.0.0/app.zip").unwrap();
        assert_eq!(parts.channel, "beta");

        assert_eq!(KeyParts::parse("acme/readme.txt"), None);
        assert_eq!(KeyParts::parse("readme.txt"), None);
    }

    #[test]
    fn test_same_tag_collapses_in_order() {
        let batch = vec![
            object("acme/stable/1.2.0/app.exe", 100),
            object("acme/stable/1.2.0/app.dmg", 200),
        ];
        let releases = group_batch(&batch, url);

        assert_eq!(releases.len(), 1);
        let release = &releases["1.2.0"];
        assert_eq!(release.tag_name, "1.2.0-stable");
        assert_eq!(release.channel, "stable");

        let names: Vec<&str> = release.assets.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["app.exe", "app.dmg"]);

        let exe = &release.assets[0];
        assert_eq!(exe.id, "etag-acme/stable/1.2.0/app.exe");
        assert_eq!(exe.size, 100);
        assert_eq!(exe.content_type, "application/octet-stream");
        assert_eq!(exe.path, "acme/stable/1.2.0/app.exe");
        assert_eq!(
            exe.url,
            "https://s3-us-east-1.amazonaws.com/releases/acme/stable/1.2.0/app.exe"
        );
    }

    #[test]
    fn test_skips_short_keys_and_directory_markers() {
        let batch = vec![
            object("acme/readme.txt", 10),
            object("acme/stable/1.2.0/", 0),
            object("acme/stable/1.2.0/empty.bin", 0),
        ];
        assert!(group_batch(&batch, url).is_empty());
    }

    #[test]
    fn test_published_at_from_first_object() {
        let mut first = object("acme/beta/2.0.0/a.zip", 1);
        first.last_modified = at(100);
        let mut second = object("acme/beta/2.0.0/b.zip", 1);
        second.last_modified = at(200);

        let releases = group_batch(&[first, second], url);
        assert_eq!(releases["2.0.0"].published_at, at(100));
    }

    #[test]
    fn test_tags_group_independently_of_channel() {
        // The tag alone identifies a release; the first object's channel wins.
        let batch = vec![
            object("acme/stable/1.0.0/a.zip", 1),
            object("acme/beta/1.0.0/b.zip", 1),
            object("acme/beta/1.1.0/c.zip", 1),
        ];
        let releases = group_batch(&batch, url);

        assert_eq!(releases.len(), 2);
        assert_eq!(releases["1.0.0"].tag_name, "1.0.0-stable");
        assert_eq!(releases["1.0.0"].assets.len(), 2);
        assert_eq!(releases["1.1.0"].tag_name, "1.1.0-beta");
    }

    #[tokio::test]
    async fn test_build_catalog_later_batch_replaces_tag() {
        let batches = stream::iter(vec![
            Ok(vec![
                object("acme/stable/1.2.0/app.exe", 100),
                object("acme/stable/1.1.0/app.exe", 90),
            ]),
            Ok(vec![object("acme/stable/1.2.0/app.dmg", 200)]),
        ]);

        let catalog = build_catalog(batches, url).await.unwrap();

        assert_eq!(catalog.len(), 2);
        let assets: Vec<&str> = catalog
            .get("1.2.0")
            .unwrap()
            .assets
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(assets, vec!["app.dmg"]);
        assert!(catalog.find_asset("1.1.0", "app.exe").is_some());
    }

    #[tokio::test]
    async fn test_build_catalog_fails_on_listing_error() {
        let batches = stream::iter(vec![
            Ok(vec![object("acme/stable/1.2.0/app.exe", 100)]),
            Err(ListingError::walk(
                "/srv",
                std::io::Error::other("disk gone"),
            )),
        ]);

        let err = build_catalog(batches, url).await.unwrap_err();
        assert!(err.to_string().contains("disk gone"));
    }

    #[tokio::test]
    async fn test_example_catalog_json() {
        let batches = stream::iter(vec![Ok(vec![
            object("acme/stable/1.2.0/app.exe", 100),
            object("acme/stable/1.2.0/app.dmg", 200),
            object("acme/readme.txt", 5),
        ])]);
        let catalog = build_catalog(batches, url).await.unwrap();

        let json = serde_json::to_value(&catalog).unwrap();
        let releases = json.as_array().unwrap();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0]["tag_name"], "1.2.0-stable");
        assert_eq!(releases[0]["channel"], "stable");
        assert_eq!(releases[0]["assets"][1]["name"], "app.dmg");
        assert_eq!(releases[0]["assets"][1]["size"], 200);
    }
}
