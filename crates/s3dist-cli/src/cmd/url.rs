//! `s3dist url`

use std::io::{self, Write};

use anyhow::{Context, Result};
use s3dist_core::{Backend, Responder};

/// Writes the redirect target URL to the wrapped writer, one per line.
struct StdoutResponder<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> Responder for StdoutResponder<W> {
    fn redirect(&mut self, location: &str) -> io::Result<()> {
        writeln!(self.out, "{location}")
    }
}

/// Print the public URL the asset redirects to.
///
/// # Errors
///
/// Returns an error if the asset is unknown or stdout cannot be written.
pub async fn url(backend: &dyn Backend, tag: &str, name: &str) -> Result<()> {
    let asset = super::find_asset(backend, tag, name).await?;
    let mut responder = StdoutResponder { out: io::stdout() };
    backend
        .serve_asset(&asset, &mut responder)
        .context("Failed to write redirect")
}
