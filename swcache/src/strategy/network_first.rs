use http::Method;
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
    /// Answers from the network, storing 2xx responses in the dynamic
    /// namespace. Falls back to the stored snapshot when the network fails
    /// or answers with a non-2xx status.
    ///
    /// Returns [`WorkerError::Unavailable`] when the fallback misses too.
    /// Requests other than `GET` never touch the namespace: their answer is
    /// returned whatever its status, and a network failure is unavailable.
    #[instrument(skip_all, fields(request = %request.descriptor()))]
    pub async fn network_first(
        &self,
        request: &InterceptedRequest,
    ) -> Result<Outcome, WorkerError> {
        if request.method() != Method::GET {
            return match self.fetcher.fetch(request).await {
                Ok(response) => Ok(Outcome::network(response)),
                Err(error) => {
                    warn!(%error, method = %request.method(), "network failed, nothing stored");
                    Err(WorkerError::Unavailable(request.descriptor().clone()))
                }
            };
        }

        let name = self.config.dynamic_namespace();
        let namespace = self.storage.open(name).await?;

        match self.fetcher.fetch(request).await {
            Ok(response) if response.is_success() => {
                store_if_success(&namespace, request.descriptor(), &response).await?;
                return Ok(Outcome::network(response));
            }
            Ok(response) => {
                debug!(status = %response.status(), "network answered with failure status");
            }
            Err(error) => {
                warn!(%error, "network failed, falling back to cache");
            }
        }

        match namespace.lookup(request.descriptor()).await? {
            Some(snapshot) => {
                debug!(namespace = %name, "serving stored snapshot");
                Ok(Outcome::cached(name.clone(), snapshot))
            }
            None => Err(WorkerError::Unavailable(request.descriptor().clone())),
        }
    }
}
