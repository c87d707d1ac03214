//! Asset delivery: redirect to the public URL, or proxy the bytes.

use std::io;

use futures::TryStreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::backend::{AssetStream, Responder};
use crate::error::FetchError;
use crate::types::{ASSET_CONTENT_TYPE, Asset};

/// Point the responder at `asset.url`. Reads nothing.
///
/// # Errors
///
/// Only fails if the responder does.
pub fn redirect(asset: &Asset, responder: &mut dyn Responder) -> io::Result<()> {
    tracing::debug!("Redirecting {} to {}", asset.name, asset.url);
    responder.redirect(&asset.url)
}

/// GET `asset.url` and hand back its body as a stream.
///
/// Non-2xx responses are returned, not turned into errors; check
/// [`AssetStream::status`].
///
/// # Errors
///
/// Returns [`FetchError::Http`] if the request cannot be sent.
pub async fn open_stream(client: &Client, asset: &Asset) -> Result<AssetStream, FetchError> {
    let response = client
        .get(&asset.url)
        .header(USER_AGENT, crate::USER_AGENT)
        .header(ACCEPT, ASSET_CONTENT_TYPE)
        .send()
        .await?;

    let status = response.status().as_u16();
    if !response.status().is_success() {
        tracing::warn!("Fetching {} returned HTTP {status}", asset.url);
    }

    Ok(AssetStream::new(
        status,
        response.content_length(),
        response.bytes_stream().map_err(FetchError::from),
    ))
}
