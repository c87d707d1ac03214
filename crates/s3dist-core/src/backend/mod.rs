//! Release repository backends.
//!
//! A backend answers catalog queries (memoized through a
//! [`ReleaseCache`](crate::cache::ReleaseCache)) and delivers assets. Each
//! variant is its own type; they share only the [`Backend`] contract.

use std::io;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{BoxStream, Stream, StreamExt, TryStreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::error::{FetchError, ListingError};
use crate::types::{Asset, Catalog};

pub mod local;
#[cfg(feature = "s3")]
pub mod s3;

pub use local::LocalBackend;
#[cfg(feature = "s3")]
pub use s3::S3Backend;

/// Receives the redirect issued by [`Backend::serve_asset`].
///
/// Implemented by whatever answers the client, e.g. an HTTP response
/// builder setting `Location`.
pub trait Responder: Send {
    /// Send the client to `location`.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be written.
    fn redirect(&mut self, location: &str) -> io::Result<()>;
}

/// Byte stream of a proxied asset, with the upstream status.
pub struct AssetStream {
    /// Upstream status code. Non-2xx statuses are reported here.
    pub status: u16,
    /// Body length, when the upstream announced one.
    pub content_length: Option<u64>,
    body: BoxStream<'static, Result<Bytes, FetchError>>,
}

impl std::fmt::Debug for AssetStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetStream")
            .field("status", &self.status)
            .field("content_length", &self.content_length)
            .finish_non_exhaustive()
    }
}

impl AssetStream {
    /// Wrap a body stream.
    pub fn new<S>(status: u16, content_length: Option<u64>, body: S) -> Self
    where
        S: Stream<Item = Result<Bytes, FetchError>> + Send + 'static,
    {
        Self {
            status,
            content_length,
            body: body.boxed(),
        }
    }

    /// Whether the upstream answered with a 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Read the whole body into memory.
    ///
    /// # Errors
    ///
    /// Returns the first error the body yields.
    pub async fn bytes(self) -> Result<Vec<u8>, FetchError> {
        self.body
            .try_fold(Vec::new(), |mut buf, chunk| async move {
                buf.extend_from_slice(&chunk);
                Ok(buf)
            })
            .await
    }

    /// Copy the body into `writer`, returning the number of bytes written.
    ///
    /// # Errors
    ///
    /// Returns the first read or write error.
    pub async fn write_to<W>(self, writer: &mut W) -> Result<u64, FetchError>
    where
        W: AsyncWrite + Unpin,
    {
        let mut body = self.body;
        let mut written: u64 = 0;

        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            writer.write_all(&chunk).await?;
            written += chunk.len() as u64;
        }

        writer.flush().await?;
        Ok(written)
    }
}

/// A release repository.
#[async_trait]
pub trait Backend: Send + Sync {
    /// All releases, computed once and cached.
    ///
    /// # Errors
    ///
    /// Returns a [`ListingError`] if the store could not be listed. Failures
    /// are not cached.
    async fn releases(&self) -> Result<Arc<Catalog>, ListingError>;

    /// Forget the cached catalog.
    fn invalidate(&self);

    /// Redirect the client to the asset's public URL. Performs no I/O.
    ///
    /// # Errors
    ///
    /// Only fails if the responder does.
    fn serve_asset(&self, asset: &Asset, responder: &mut dyn Responder) -> io::Result<()> {
        crate::resolver::redirect(asset, responder)
    }

    /// Open a proxied byte stream of the asset.
    ///
    /// # Errors
    ///
    /// Returns a [`FetchError`] if the asset could not be reached. An HTTP
    /// error status is not an error; it is carried on the stream.
    async fn asset_stream(&self, asset: &Asset) -> Result<AssetStream, FetchError>;
}
