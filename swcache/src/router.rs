//! Request routing.
//!
//! Rules are checked in order and the first match wins:
//!
//! 1. URL contains a network-first pattern: [`Route::NetworkFirst`]
//! 2. styles, scripts, images and fonts: [`Route::CacheFirst`]
//! 3. documents: [`Route::StaleWhileRevalidate`]
//! 4. anything else: [`Route::CacheThenNetwork`]
//!
//! Requests whose scheme is neither `http` nor `https` are never routed.

use std::fmt;
use std::time::Instant;

use swcache_backend::CacheStorage;
use swcache_core::{Destination, Fetch, InterceptedRequest, Offload};
use tracing::{debug, instrument};

use crate::context::{Interception, Outcome};
use crate::error::WorkerError;
use crate::metrics;
use crate::strategy::Strategies;

/// The strategy chosen for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    /// Network, then the dynamic namespace.
    NetworkFirst,
    /// Static namespace, then network.
    CacheFirst,
    /// Dynamic namespace answered at once, refreshed in the background.
    StaleWhileRevalidate,
    /// Any namespace, then network, then the offline fallback.
    CacheThenNetwork,
}

impl Route {
    /// Returns the route as a string slice.
    pub const fn as_str(self) -> &'static str {
        match self {
            Route::NetworkFirst => "network_first",
            Route::CacheFirst => "cache_first",
            Route::StaleWhileRevalidate => "stale_while_revalidate",
            Route::CacheThenNetwork => "cache_then_network",
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Dispatches intercepted requests to a strategy.
#[derive(Debug)]
pub struct Router<S, F, O> {
    strategies: Strategies<S, F, O>,
}

impl<S, F, O: Clone> Clone for Router<S, F, O> {
    fn clone(&self) -> Self {
        Self {
            strategies: self.strategies.clone(),
        }
    }
}

impl<S, F, O> Router<S, F, O>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
    O: Offload,
{
    /// Routes requests through `strategies`.
    pub fn new(strategies: Strategies<S, F, O>) -> Self {
        Self { strategies }
    }

    /// The strategies requests are dispatched to.
    pub fn strategies(&self) -> &Strategies<S, F, O> {
        &self.strategies
    }

    /// Picks the route for `request`.
    ///
    /// Returns `None` for non-`http(s)` requests, which are left alone.
    pub fn classify(&self, request: &InterceptedRequest) -> Option<Route> {
        if !request.descriptor().is_http() {
            return None;
        }
        let route = if self.strategies.config().is_network_first(request.url()) {
            Route::NetworkFirst
        } else if request.destination().is_static_subresource() {
            Route::CacheFirst
        } else if request.destination() == Destination::Document {
            Route::StaleWhileRevalidate
        } else {
            Route::CacheThenNetwork
        };
        Some(route)
    }

    /// Routes `request` and runs the chosen strategy.
    #[instrument(
        skip_all,
        fields(request = %request.descriptor(), destination = %request.destination())
    )]
    pub async fn route(&self, request: &InterceptedRequest) -> Result<Interception, WorkerError> {
        let Some(route) = self.classify(request) else {
            debug!("not intercepted");
            return Ok(Interception::Passthrough);
        };
        debug!(%route, "routing");

        let start = Instant::now();

        let result = self.run(route, request).await;

        match &result {
            Ok(outcome) => {
                let source = outcome.source.as_str();
                debug!(%route, source, status = %outcome.response.status(), "answered");
                metrics::record_response(route.as_str(), source, start.elapsed());
            }
            Err(WorkerError::Unavailable(_) | WorkerError::Network(_)) => {
                metrics::record_unavailable(route.as_str());
            }
            Err(_) => {}
        }

        result.map(Interception::Respond)
    }

    async fn run(
        &self,
        route: Route,
        request: &InterceptedRequest,
    ) -> Result<Outcome, WorkerError> {
        match route {
            Route::NetworkFirst => self.strategies.network_first(request).await,
            Route::CacheFirst => self.strategies.cache_first(request).await,
            Route::StaleWhileRevalidate => self.strategies.stale_while_revalidate(request).await,
            Route::CacheThenNetwork => self.strategies.cache_then_network(request).await,
        }
    }
}
