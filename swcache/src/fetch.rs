//! Live fetches bounded by the configured timeout.

use std::time::Duration;

use async_trait::async_trait;
use swcache_core::{Fetch, FetchError, InterceptedRequest, ResponseSnapshot};
use tracing::warn;

/// A [`Fetch`] that gives up after a fixed time.
///
/// The worker wraps its fetcher in one of these, built from
/// [`WorkerConfig::fetch_timeout`](crate::WorkerConfig::fetch_timeout), so
/// install, every strategy, background refreshes and sync share one bound.
/// An elapsed fetch fails with [`FetchError::Timeout`], which strategies
/// handle like any other network failure.
#[derive(Debug, Clone)]
pub struct BoundedFetch<F> {
    inner: F,
    timeout: Option<Duration>,
}

impl<F> BoundedFetch<F> {
    /// Bounds `inner` by `timeout`. `None` leaves it unbounded.
    pub fn new(inner: F, timeout: Option<Duration>) -> Self {
        Self { inner, timeout }
    }

    /// The bound applied to every fetch.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout
    }
}

#[async_trait]
impl<F> Fetch for BoundedFetch<F>
where
    F: Fetch,
{
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        let Some(limit) = self.timeout else {
            return self.inner.fetch(request).await;
        };
        match tokio::time::timeout(limit, self.inner.fetch(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!(
                    request = %request.descriptor(),
                    timeout_ms = limit.as_millis(),
                    "fetch timed out"
                );
                Err(FetchError::Timeout(limit))
            }
        }
    }
}
