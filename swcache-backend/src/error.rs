//! Error types for storage operations.

use swcache_core::NamespaceName;
use thiserror::Error;

/// Error type for storage operations.
///
/// Storage errors are never absorbed by the strategies: they propagate to
/// whoever issued the request.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The storage refused a write because it is full.
    #[error("quota exceeded in namespace {namespace}")]
    QuotaExceeded {
        /// Namespace that rejected the write.
        namespace: NamespaceName,
    },

    /// The namespace was deleted while a handle to it was still in use.
    #[error("namespace {0} no longer exists")]
    NamespaceMissing(NamespaceName),

    /// Internal storage error (I/O, corrupted state).
    #[error(transparent)]
    Internal(Box<dyn std::error::Error + Send + Sync>),
}

impl StorageError {
    /// Wraps any error as an internal storage failure.
    pub fn internal(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        StorageError::Internal(Box::new(err))
    }
}
