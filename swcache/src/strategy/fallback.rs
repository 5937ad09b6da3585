use swcache_backend::CacheStorage;
use swcache_core::{Fetch, InterceptedRequest, Offload};
use tracing::{debug, info, instrument, warn};

use super::Strategies;
use crate::context::Outcome;
use crate::error::WorkerError;

impl<S, F, O> Strategies<S, F, O>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    O: Offload,
{
    /// Answers from any namespace, else from the network without storing.
    ///
    /// When the network fails on a navigation, serves the offline fallback
    /// document instead. Any other failure is [`WorkerError::Unavailable`].
    #[instrument(skip_all, fields(request = %request.descriptor()))]
    pub async fn cache_then_network(
        &self,
        request: &InterceptedRequest,
    ) -> Result<Outcome, WorkerError> {
        if let Some((name, snapshot)) = self.storage.lookup_any(request.descriptor()).await? {
            debug!(namespace = %name, "cache hit");
            return Ok(Outcome::cached(name, snapshot));
        }

        let error = match self.fetcher.fetch(request).await {
            Ok(response) => return Ok(Outcome::network(response)),
            Err(error) => error,
        };

        if !request.is_navigation() {
            warn!(%error, "network failed and nothing is cached");
            return Err(WorkerError::Unavailable(request.descriptor().clone()));
        }

        let fallback = self.config.offline_fallback();
        match self.storage.lookup_any(fallback).await? {
            Some((name, snapshot)) => {
                info!(%error, fallback = %fallback, "serving offline fallback");
                Ok(Outcome::fallback(name, snapshot))
            }
            None => {
                warn!(%error, fallback = %fallback, "offline fallback is not cached");
                Err(WorkerError::Unavailable(request.descriptor().clone()))
            }
        }
    }
}
