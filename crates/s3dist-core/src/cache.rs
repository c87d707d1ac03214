//! Memoized catalog accessor.
//!
//! The cache holds one of three states behind a single mutex:
//!
//! - `Empty`: nothing computed yet, or the last computation failed.
//! - `Pending`: a build is in flight. Every caller clones and awaits the same
//!   shared future, so at most one listing runs per cache at a time.
//! - `Resolved`: the catalog is kept until [`ReleaseCache::invalidate`].
//!
//! The mutex is only held for state transitions, never across an await.
//! A pending build whose waiters are all dropped stays installed; the next
//! caller resumes it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};

use crate::error::ListingError;
use crate::grouper::build_catalog;
use crate::lister::ObjectLister;
use crate::types::Catalog;

type CatalogResult = Result<Arc<Catalog>, ListingError>;
type SharedBuild = Shared<BoxFuture<'static, CatalogResult>>;

enum State {
    Empty,
    Pending { generation: u64, build: SharedBuild },
    Resolved(Arc<Catalog>),
}

struct Inner {
    state: State,
    generation: u64,
}

/// Lists and groups the store once, then serves the cached catalog.
pub struct ReleaseCache {
    lister: Arc<dyn ObjectLister>,
    prefix: Option<String>,
    inner: Mutex<Inner>,
}

impl std::fmt::Debug for ReleaseCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = match self.lock().state {
            State::Empty => "empty",
            State::Pending { .. } => "pending",
            State::Resolved(_) => "resolved",
        };
        f.debug_struct("ReleaseCache")
            .field("prefix", &self.prefix)
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

impl ReleaseCache {
    /// Create an empty cache over `lister`, listing keys under `prefix`.
    pub fn new(lister: Arc<dyn ObjectLister>, prefix: Option<String>) -> Self {
        Self {
            lister,
            prefix,
            inner: Mutex::new(Inner {
                state: State::Empty,
                generation: 0,
            }),
        }
    }

    /// Return the catalog, building it on the first call.
    ///
    /// Concurrent callers arriving while a build is in flight share its
    /// result. A failed build is not cached.
    ///
    /// # Errors
    ///
    /// Returns the [`ListingError`] of the build this call waited on.
    pub async fn get(&self) -> CatalogResult {
        let (generation, build) = {
            let mut inner = self.lock();
            let inner = &mut *inner;
            match &inner.state {
                State::Resolved(catalog) => return Ok(Arc::clone(catalog)),
                State::Pending { generation, build } => (*generation, build.clone()),
                State::Empty => {
                    inner.generation += 1;
                    tracing::debug!("Release cache miss, listing store");
                    let build = self.start_build();
                    inner.state = State::Pending {
                        generation: inner.generation,
                        build: build.clone(),
                    };
                    (inner.generation, build)
                }
            }
        };

        let result = build.await;

        let mut inner = self.lock();
        if matches!(&inner.state, State::Pending { generation: g, .. } if *g == generation) {
            inner.state = match &result {
                Ok(catalog) => State::Resolved(Arc::clone(catalog)),
                Err(e) => {
                    tracing::warn!("Release listing failed: {e}");
                    State::Empty
                }
            };
        }
        result
    }

    /// Drop a resolved catalog so the next [`get`](Self::get) lists again.
    ///
    /// An in-flight build is left alone.
    pub fn invalidate(&self) {
        let mut inner = self.lock();
        if matches!(inner.state, State::Resolved(_)) {
            inner.state = State::Empty;
        }
    }

    /// Whether a catalog is currently cached.
    pub fn is_resolved(&self) -> bool {
        matches!(self.lock().state, State::Resolved(_))
    }

    fn start_build(&self) -> SharedBuild {
        let lister = Arc::clone(&self.lister);
        let prefix = self.prefix.clone();

        async move {
            let batches = lister.list(prefix.as_deref());
            let catalog = build_catalog(batches, |key| lister.public_url(key)).await?;
            Ok(Arc::new(catalog))
        }
        .boxed()
        .shared()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
