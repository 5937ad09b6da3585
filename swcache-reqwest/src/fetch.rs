//! `Fetch` implementation over a reqwest client.

use std::time::Duration;

use async_trait::async_trait;
use swcache_core::{Fetch, FetchError, InterceptedRequest, ResponseSnapshot};
use tracing::{debug, instrument};

/// Fetcher that performs requests with a shared [`reqwest::Client`].
///
/// The client is cloned cheaply (it is reference counted internally), so a
/// single `ReqwestFetch` can serve every strategy and background task.
///
/// No timeout is applied unless [`with_timeout`](Self::with_timeout) is
/// called; a hung request then holds its task until the client gives up.
#[derive(Debug, Clone)]
pub struct ReqwestFetch {
    client: reqwest::Client,
    timeout: Option<Duration>,
}

impl ReqwestFetch {
    /// Create a fetcher around an existing client.
    pub fn new(client: reqwest::Client) -> Self {
        Self {
            client,
            timeout: None,
        }
    }

    /// Bound every fetch, including reading the body, by `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Same as [`with_timeout`](Self::with_timeout), taking an optional value.
    pub fn with_optional_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        let response = self
            .client
            .request(request.method().clone(), request.url().as_str())
            .headers(request.headers().clone())
            .send()
            .await
            .map_err(map_error)?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await.map_err(map_error)?;

        debug!(%status, bytes = body.len(), "network response");
        Ok(ResponseSnapshot::new(status, headers, body))
    }
}

impl Default for ReqwestFetch {
    fn default() -> Self {
        Self::new(reqwest::Client::new())
    }
}

#[async_trait]
impl Fetch for ReqwestFetch {
    #[instrument(skip_all, fields(url = %request.url()))]
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        if !request.descriptor().is_http() {
            return Err(FetchError::UnsupportedScheme(
                request.url().scheme().to_owned(),
            ));
        }

        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.send(request))
                .await
                .map_err(|_| FetchError::Timeout(limit))?,
            None => self.send(request).await,
        }
    }
}

fn map_error(err: reqwest::Error) -> FetchError {
    if err.is_builder() {
        FetchError::InvalidRequest(err.to_string())
    } else {
        FetchError::network(err)
    }
}
