//! `ListObjectsV2` lister for S3 and S3-compatible stores.

use aws_sdk_s3 as s3;
use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};

use super::{BatchStream, ObjectLister};
use crate::config::S3Config;
use crate::error::{ConfigError, ListingError};
use crate::types::ObjectMeta;

/// Lists a bucket page by page, following continuation tokens.
#[derive(Debug, Clone)]
pub struct S3Lister {
    client: s3::Client,
    config: S3Config,
}

impl S3Lister {
    /// Build a client from static credentials.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Missing`] if `key`, `secret` or `bucket` is empty.
    pub fn new(config: S3Config) -> Result<Self, ConfigError> {
        config.validate()?;

        let credentials =
            s3::config::Credentials::new(&config.key, &config.secret, None, None, "s3dist");

        let mut builder = s3::Config::builder()
            .behavior_version_latest()
            .region(s3::config::Region::new(config.region.clone()))
            .credentials_provider(credentials);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }

        Ok(Self {
            client: s3::Client::from_conf(builder.build()),
            config,
        })
    }

    /// The configuration this lister was built from.
    pub fn config(&self) -> &S3Config {
        &self.config
    }
}

impl ObjectLister for S3Lister {
    fn list(&self, prefix: Option<&str>) -> BatchStream {
        let client = self.client.clone();
        let bucket = self.config.bucket.clone();
        let prefix = prefix.map(str::to_string);

        // State: `Some(token)` while pages remain, `None` once the listing is exhausted.
        stream::try_unfold(Some(None::<String>), move |state| {
            let client = client.clone();
            let bucket = bucket.clone();
            let prefix = prefix.clone();
            async move {
                let Some(token) = state else {
                    return Ok::<_, ListingError>(None);
                };

                let resp = client
                    .list_objects_v2()
                    .bucket(&bucket)
                    .set_prefix(prefix.clone())
                    .set_continuation_token(token)
                    .send()
                    .await
                    .map_err(|e| {
                        tracing::warn!("ListObjectsV2 on {bucket} failed: {e}");
                        ListingError::store(&bucket, prefix.clone().unwrap_or_default(), e)
                    })?;

                let batch: Vec<ObjectMeta> =
                    resp.contents().iter().filter_map(object_meta).collect();
                tracing::debug!("Listed {} objects from s3://{bucket}", batch.len());

                let next = if resp.is_truncated().unwrap_or(false) {
                    resp.next_continuation_token().map(|t| Some(t.to_string()))
                } else {
                    None
                };
                Ok(Some((batch, next)))
            }
        })
        .boxed()
    }

    fn public_url(&self, key: &str) -> String {
        self.config.public_url(key)
    }
}

fn object_meta(object: &s3::types::Object) -> Option<ObjectMeta> {
    let key = object.key()?;
    let last_modified = object
        .last_modified()
        .and_then(|t| DateTime::<Utc>::from_timestamp(t.secs(), t.subsec_nanos()))
        .unwrap_or_default();

    Some(ObjectMeta {
        key: key.to_string(),
        size: object.size().and_then(|s| u64::try_from(s).ok()).unwrap_or(0),
        last_modified,
        checksum: object.e_tag().unwrap_or_default().to_string(),
    })
}
