//! s3dist-core - release repository over an object store.
//!
//! Turns a flat bucket of objects laid out as
//! `<prefix>/<channel>/<tag>/<filename>` into a [`Catalog`] of releases,
//! and delivers individual assets by redirect or by proxying their bytes.
//!
//! # Architecture
//!
//! - [`lister`]: streams object metadata out of S3 or a local directory.
//! - [`grouper`]: folds listed objects into releases keyed by tag.
//! - [`cache`]: memoizes the catalog, one listing at a time.
//! - [`resolver`]: redirect or proxy a single asset.
//! - [`backend`]: the [`Backend`] contract and its S3 and local variants.

pub mod backend;
pub mod cache;
pub mod config;
pub mod error;
pub mod grouper;
pub mod lister;
pub mod resolver;
pub mod types;

pub use backend::{AssetStream, Backend, LocalBackend, Responder};
#[cfg(feature = "s3")]
pub use backend::S3Backend;
pub use cache::ReleaseCache;
pub use config::{LocalConfig, S3Config};
pub use error::{ConfigError, FetchError, ListingError};
pub use types::{Asset, Catalog, ObjectMeta, Release};

/// User-Agent sent on proxied asset requests.
pub const USER_AGENT: &str = concat!("s3dist/", env!("CARGO_PKG_VERSION"));
