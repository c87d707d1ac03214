//! S3 bucket backend.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;

use super::{AssetStream, Backend};
use crate::cache::ReleaseCache;
use crate::config::S3Config;
use crate::error::{ConfigError, FetchError, ListingError};
use crate::lister::S3Lister;
use crate::types::{Asset, Catalog};

/// Releases stored in an S3 bucket under `.../<channel>/<tag>/<file>`.
///
/// Assets are redirected to, or proxied from,
/// `https://s3-<region>.amazonaws.com/<bucket>/<key>`.
#[derive(Debug)]
pub struct S3Backend {
    cache: ReleaseCache,
    http: Client,
}

impl S3Backend {
    /// Create a backend for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `key`, `secret` or `bucket` is empty.
    pub fn new(config: S3Config) -> Result<Self, ConfigError> {
        let prefix = config.prefix.clone();
        let lister = S3Lister::new(config)?;
        tracing::debug!(
            "S3 backend for bucket {} (prefix {:?})",
            lister.config().bucket,
            prefix
        );

        Ok(Self {
            cache: ReleaseCache::new(Arc::new(lister), prefix),
            http: Client::new(),
        })
    }
}

#[async_trait]
impl Backend for S3Backend {
    async fn releases(&self) -> Result<Arc<Catalog>, ListingError> {
        self.cache.get().await
    }

    fn invalidate(&self) {
        self.cache.invalidate();
    }

    async fn asset_stream(&self, asset: &Asset) -> Result<AssetStream, FetchError> {
        crate::resolver::open_stream(&self.http, asset).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn test_new_rejects_missing_secret() {
        let err = S3Backend::new(S3Config::new("AKIDEXAMPLE", "", "releases")).unwrap_err();
        assert_eq!(err, ConfigError::Missing("secret"));
    }

    #[tokio::test]
    async fn test_releases_are_listed_once() {
        let mut server = Server::new_async().await;
        let m = server
            .mock("GET", Matcher::Regex(r"^/releases/?$".to_string()))
            .match_query(Matcher::Any)
            .with_status(200)
            .with_header("content-type", "application/xml")
            .with_body(
                r#"<?xml version="1.0" encoding="UTF-8"?>
<ListBucketResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>releases</Name>
  <Prefix>acme/</Prefix>
  <KeyCount>3</KeyCount>
  <MaxKeys>1000</MaxKeys>
  <IsTruncated>false</IsTruncated>
  <Contents>
    <Key>acme/stable/1.2.0/app.exe</Key>
    <LastModified>2024-03-01T12:00:00.000Z</LastModified>
    <ETag>&quot;exe&quot;</ETag>
    <Size>100</Size>
  </Contents>
  <Contents>
    <Key>acme/stable/1.2.0/app.dmg</Key>
    <LastModified>2024-03-01T12:05:00.000Z</LastModified>
    <ETag>&quot;dmg&quot;</ETag>
    <Size>200</Size>
  </Contents>
  <Contents>
    <Key>acme/readme.txt</Key>
    <LastModified>2024-03-01T12:00:00.000Z</LastModified>
    <ETag>&quot;txt&quot;</ETag>
    <Size>5</Size>
  </Contents>
</ListBucketResult>"#,
            )
            .expect(1)
            .create_async()
            .await;

        let backend = S3Backend::new(
            S3Config::new("AKIDEXAMPLE", "secret", "releases")
                .with_prefix("acme/")
                .with_region("eu-central-1")
                .with_endpoint(server.url()),
        )
        .unwrap();

        let catalog = backend.releases().await.unwrap();
        let again = backend.releases().await.unwrap();
        assert!(Arc::ptr_eq(&catalog, &again));

        assert_eq!(catalog.len(), 1);
        let release = catalog.get("1.2.0").unwrap();
        assert_eq!(release.tag_name, "1.2.0-stable");
        assert_eq!(release.assets.len(), 2);
        assert_eq!(
            release.assets[1].url,
            "https://s3-eu-central-1.amazonaws.com/releases/acme/stable/1.2.0/app.dmg"
        );
        m.assert_async().await;
    }
}
