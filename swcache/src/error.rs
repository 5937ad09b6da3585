//! Worker error types.

use http::StatusCode;
use swcache_backend::StorageError;
use swcache_core::{FetchError, RequestDescriptor};
use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::LifecycleState;

/// Error returned by worker operations.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A storage operation failed.
    #[error(transparent)]
    Storage(#[from] StorageError),

    /// The network failed and no cached answer applies.
    #[error(transparent)]
    Network(#[from] FetchError),

    /// Neither the network nor any namespace could answer the request.
    #[error("{0} is unavailable offline")]
    Unavailable(RequestDescriptor),

    /// Provisioning a static asset failed; nothing was committed.
    #[error("install failed on {asset}: {cause}")]
    InstallFailed {
        /// The asset that failed.
        asset: RequestDescriptor,
        /// Status or fetch error.
        #[source]
        cause: InstallCause,
    },

    /// A lifecycle phase was requested from the wrong state.
    #[error("cannot move from {from} to {to}")]
    InvalidTransition {
        /// State the worker was in.
        from: LifecycleState,
        /// State that was asked for.
        to: LifecycleState,
    },

    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Why a single asset could not be provisioned.
#[derive(Debug, Error)]
pub enum InstallCause {
    /// The asset answered with a non-2xx status.
    #[error("responded with {0}")]
    Status(StatusCode),

    /// The asset could not be fetched.
    #[error(transparent)]
    Fetch(#[from] FetchError),
}
