//! The live network boundary.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::FetchError;
use crate::request::InterceptedRequest;
use crate::snapshot::ResponseSnapshot;

/// Performs live network fetches on behalf of the proxy.
///
/// Any response that arrives is returned as `Ok`, whatever its status;
/// deciding whether a status is worth caching is up to the strategy.
/// `Err` means no response was obtained at all.
///
/// # Examples
///
/// ```rust,ignore
/// use swcache_core::{Fetch, FetchError, InterceptedRequest, ResponseSnapshot};
///
/// struct Offline;
///
/// #[async_trait::async_trait]
/// impl Fetch for Offline {
///     async fn fetch(&self, _req: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
///         Err(FetchError::offline("airplane mode"))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Fetch the request from the network.
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError>;
}

#[async_trait]
impl<T> Fetch for Arc<T>
where
    T: Fetch + ?Sized,
{
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl Fetch for Box<dyn Fetch> {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        (**self).fetch(request).await
    }
}
