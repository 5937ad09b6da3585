//! Errors raised at the network boundary.

use std::time::Duration;
use thiserror::Error;

/// Error returned by a [`Fetch`](crate::Fetch) implementation.
///
/// A fetch that reaches the server and receives any status, including 4xx
/// and 5xx, is not an error: the status is part of the returned snapshot.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The network could not be reached (DNS, connection refused, offline).
    #[error("network error: {0}")]
    Network(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// No response arrived within the configured limit.
    #[error("fetch timed out after {0:?}")]
    Timeout(Duration),

    /// The fetcher does not speak the request's scheme.
    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    /// The request could not be built (invalid URL, method or header).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Wraps any error as a network failure.
    pub fn network(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        FetchError::Network(Box::new(err))
    }

    /// Network failure with a plain message.
    pub fn offline(message: impl Into<String>) -> Self {
        let message: String = message.into();
        FetchError::Network(message.into())
    }
}
