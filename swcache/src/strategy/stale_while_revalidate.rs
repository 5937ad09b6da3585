use std::sync::Arc;

use swcache_backend::{CacheStorage, Namespace};
use swcache_core::{Fetch, InterceptedRequest, Offload};
use tracing::{debug, instrument, warn};

use super::{Strategies, store_if_success};
use crate::context::Outcome;
use crate::error::WorkerError;

impl<S, F, O> Strategies<S, F, O>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    O: Offload,
{
    /// Answers from the dynamic namespace immediately and refreshes the entry
    /// in the background. On a miss, waits for the network instead.
    ///
    /// The background refresh never affects the returned response: its
    /// failures are logged and a non-2xx answer leaves the entry untouched.
    /// Concurrent hits on the same descriptor share one refresh.
    #[instrument(skip_all, fields(request = %request.descriptor()))]
    pub async fn stale_while_revalidate(
        &self,
        request: &InterceptedRequest,
    ) -> Result<Outcome, WorkerError> {
        let name = self.config.dynamic_namespace();
        let namespace = self.storage.open(name).await?;

        match namespace.lookup(request.descriptor()).await? {
            Some(snapshot) => {
                self.revalidate(namespace, request.clone());
                debug!(namespace = %name, "serving stored snapshot while revalidating");
                Ok(Outcome::cached(name.clone(), snapshot))
            }
            None => {
                debug!(namespace = %name, "cache miss, fetching");
                let response = self.fetcher.fetch(request).await?;
                store_if_success(&namespace, request.descriptor(), &response).await?;
                Ok(Outcome::network(response))
            }
        }
    }

    fn revalidate(&self, namespace: S::Namespace, request: InterceptedRequest) {
        let fetcher = Arc::clone(&self.fetcher);
        let descriptor = request.descriptor().clone();

        let spawned = self.refreshes.spawn_refresh(descriptor, async move {
            let response = match fetcher.fetch(&request).await {
                Ok(response) => response,
                Err(error) => {
                    warn!(request = %request.descriptor(), %error, "revalidation failed");
                    return;
                }
            };
            match store_if_success(&namespace, request.descriptor(), &response).await {
                Ok(true) => debug!(request = %request.descriptor(), "entry revalidated"),
                Ok(false) => {}
                Err(error) => warn!(
                    request = %request.descriptor(),
                    %error,
                    "failed to store revalidated entry"
                ),
            }
        });
        if !spawned {
            debug!("revalidation already in flight");
        }
    }
}
