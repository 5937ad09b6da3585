//! Caching strategies.
//!
//! Each strategy answers one intercepted request from a namespace, the
//! network, or both:
//!
//! - [`cache_first`](Strategies::cache_first): static namespace, network
//!   only on a miss.
//! - [`network_first`](Strategies::network_first): network, dynamic
//!   namespace when the network fails.
//! - [`stale_while_revalidate`](Strategies::stale_while_revalidate): dynamic
//!   namespace, refreshed in the background.
//! - [`cache_then_network`](Strategies::cache_then_network): every
//!   namespace, then the network, then the offline fallback. Never writes.
//!
//! The first three write 2xx answers to `GET` requests. Any other answer is
//! still returned to the caller; it is just never stored. Storage errors
//! always propagate.

mod cache_first;
mod fallback;
mod network_first;
mod stale_while_revalidate;

use std::sync::Arc;

use http::Method;
use swcache_backend::{CacheStorage, Namespace};
use swcache_core::{Fetch, Offload, RequestDescriptor, ResponseSnapshot};
use tracing::debug;

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// The strategy executor.
///
/// Holds everything a strategy needs: the configuration, the storage, the
/// fetcher and the [`Offload`] spawning background refreshes.
pub struct Strategies<S, F, O> {
    config: Arc<WorkerConfig>,
    storage: Arc<S>,
    fetcher: Arc<F>,
    refreshes: O,
}

impl<S, F, O> Clone for Strategies<S, F, O>
where
    O: Clone,
{
    fn clone(&self) -> Self {
        Self {
            config: Arc::clone(&self.config),
            storage: Arc::clone(&self.storage),
            fetcher: Arc::clone(&self.fetcher),
            refreshes: self.refreshes.clone(),
        }
    }
}

impl<S, F, O> std::fmt::Debug for Strategies<S, F, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategies")
            .field("static_namespace", self.config.static_namespace())
            .field("dynamic_namespace", self.config.dynamic_namespace())
            .finish_non_exhaustive()
    }
}

impl<S, F, O> Strategies<S, F, O>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    O: Offload,
{
    /// Creates an executor over shared handles.
    pub fn new(
        config: Arc<WorkerConfig>,
        storage: Arc<S>,
        fetcher: Arc<F>,
        refreshes: O,
    ) -> Self {
        Self {
            config,
            storage,
            fetcher,
            refreshes,
        }
    }

    /// The configuration every strategy reads.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Spawner of background refreshes.
    pub fn refreshes(&self) -> &O {
        &self.refreshes
    }
}

/// Stores `response` under `descriptor` if it is a 2xx answer to a `GET`.
///
/// Answers to other methods are never stored, so a form submission is not
/// replayed from cache. Returns `true` if it was stored.
pub(crate) async fn store_if_success<N>(
    namespace: &N,
    descriptor: &RequestDescriptor,
    response: &ResponseSnapshot,
) -> Result<bool, WorkerError>
where
    N: Namespace + ?Sized,
{
    if descriptor.method() != Method::GET {
        debug!(
            namespace = %namespace.name(),
            method = %descriptor.method(),
            "not storing answer to a non-GET request"
        );
        return Ok(false);
    }
    if !response.is_success() {
        debug!(
            namespace = %namespace.name(),
            status = %response.status(),
            "not storing non-success response"
        );
        return Ok(false);
    }
    namespace.put(descriptor, response.clone()).await?;
    Ok(true)
}
