use swcache_backend::{CacheStorage, Namespace};
use swcache_core::{Fetch, InterceptedRequest, Offload};
use tracing::{debug, instrument};

use super::{Strategies, store_if_success};
use crate::context::Outcome;
use crate::error::WorkerError;

impl<S, F, O> Strategies<S, F, O>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    O: Offload,
{
    /// Answers from the static namespace, fetching and storing on a miss.
    ///
    /// A network failure on a miss propagates as [`WorkerError::Network`].
    #[instrument(skip_all, fields(request = %request.descriptor()))]
    pub async fn cache_first(&self, request: &InterceptedRequest) -> Result<Outcome, WorkerError> {
        let name = self.config.static_namespace();
        let namespace = self.storage.open(name).await?;

        if let Some(snapshot) = namespace.lookup(request.descriptor()).await? {
            debug!(namespace = %name, "cache hit");
            return Ok(Outcome::cached(name.clone(), snapshot));
        }

        debug!(namespace = %name, "cache miss, fetching");
        let response = self.fetcher.fetch(request).await?;
        store_if_success(&namespace, request.descriptor(), &response).await?;
        Ok(Outcome::network(response))
    }
}
