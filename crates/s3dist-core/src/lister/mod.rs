//! Object listers - stream object metadata out of a backing store.

use futures::stream::BoxStream;

use crate::error::ListingError;
use crate::types::ObjectMeta;

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalLister;
#[cfg(feature = "s3")]
pub use s3::S3Lister;

/// Batches of object metadata, ending at the first error.
pub type BatchStream = BoxStream<'static, Result<Vec<ObjectMeta>, ListingError>>;

/// A store whose objects can be listed by key prefix.
///
/// The bucket (or root directory) is bound when the lister is built.
pub trait ObjectLister: Send + Sync {
    /// Stream every object under `prefix`, one batch per store page.
    fn list(&self, prefix: Option<&str>) -> BatchStream;

    /// Public URL clients can fetch `key` from.
    fn public_url(&self, key: &str) -> String;
}
