//! Detached background refreshes.
//!
//! Stale-while-revalidate answers from cache and refreshes the entry in a
//! detached task. The [`Offload`] trait abstracts over how that task is
//! spawned, so strategies do not depend on a particular runtime handle.

use std::future::Future;

use crate::descriptor::RequestDescriptor;

/// Spawns background refreshes of stored entries.
///
/// # Clone bound
///
/// Implementors should use `Arc` internally so that all clones see the same
/// set of running refreshes.
///
/// # Example
///
/// ```ignore
/// use swcache_core::Offload;
///
/// fn refresh_later<O: Offload>(offload: &O, key: RequestDescriptor) {
///     offload.spawn_refresh(key, async move {
///         // fetch and store the new snapshot
///     });
/// }
/// ```
pub trait Offload: Send + Sync + Clone {
    /// Spawns `refresh` for the entry stored under `key`.
    ///
    /// Implementations may skip it while another refresh of the same key is
    /// still running. Returns `true` if the refresh was spawned.
    fn spawn_refresh<F>(&self, key: RequestDescriptor, refresh: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static;
}
