//! Background refreshes for stale-while-revalidate.
//!
//! A hit in the dynamic namespace is answered at once and the entry is
//! refreshed in a detached task. [`RefreshManager`] owns those tasks: it
//! runs at most one refresh per descriptor and lets callers wait until every
//! refresh has settled.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use swcache_core::{Offload, RequestDescriptor};
use tokio::task::JoinHandle;
use tracing::{Instrument, debug, info_span};

use crate::metrics;

/// A spawned refresh and the generation owning its slot.
#[derive(Debug)]
struct Running {
    handle: JoinHandle<()>,
    generation: u64,
}

#[derive(Debug, Default)]
struct Registry {
    running: DashMap<RequestDescriptor, Running>,
    generations: AtomicU64,
}

impl Registry {
    // A refresh that finished after being replaced must not evict its
    // replacement, so the slot is only cleared by the generation holding it.
    fn release(&self, descriptor: &RequestDescriptor, generation: u64) {
        self.running
            .remove_if(descriptor, |_, running| running.generation == generation);
    }
}

/// Runs stale-while-revalidate refreshes detached from the request that
/// triggered them.
///
/// A refresh of a descriptor is skipped while another one for the same
/// descriptor is still running, so concurrent hits share one network call.
/// Refreshes are bounded by the worker's fetch timeout, which applies to the
/// fetch inside them.
///
/// Cloning is cheap; clones share the set of running refreshes.
#[derive(Clone, Debug, Default)]
pub struct RefreshManager {
    registry: Arc<Registry>,
}

impl RefreshManager {
    /// Creates a manager with no running refreshes.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of refreshes still running.
    pub fn in_flight(&self) -> usize {
        self.registry
            .running
            .iter()
            .filter(|running| !running.handle.is_finished())
            .count()
    }

    /// Returns `true` while a refresh of `descriptor` is running.
    pub fn is_refreshing(&self, descriptor: &RequestDescriptor) -> bool {
        self.registry
            .running
            .get(descriptor)
            .is_some_and(|running| !running.handle.is_finished())
    }

    /// Waits until every refresh, including ones spawned meanwhile, settled.
    pub async fn settle(&self) {
        loop {
            self.registry
                .running
                .retain(|_, running| !running.handle.is_finished());
            if self.registry.running.is_empty() {
                break;
            }
            tokio::task::yield_now().await;
        }
    }

    /// Same as [`settle`](Self::settle), giving up after `timeout`.
    ///
    /// Returns `true` if every refresh settled in time.
    pub async fn settle_within(&self, timeout: Duration) -> bool {
        tokio::time::timeout(timeout, self.settle()).await.is_ok()
    }

    fn start<F>(&self, descriptor: RequestDescriptor, refresh: F) -> Running
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let generation = self.registry.generations.fetch_add(1, Ordering::Relaxed);
        let registry = Arc::clone(&self.registry);
        let span = info_span!("refresh", request = %descriptor, generation);

        let handle = tokio::spawn(
            async move {
                let started = Instant::now();
                refresh.await;
                metrics::record_refresh_finished(started.elapsed());
                registry.release(&descriptor, generation);
            }
            .instrument(span),
        );
        Running { handle, generation }
    }
}

impl Offload for RefreshManager {
    fn spawn_refresh<F>(&self, key: RequestDescriptor, refresh: F) -> bool
    where
        F: Future<Output = ()> + Send + 'static,
    {
        match self.registry.running.entry(key.clone()) {
            Entry::Occupied(mut slot) => {
                if !slot.get().handle.is_finished() {
                    debug!(request = %key, "refresh already in flight");
                    metrics::record_refresh_skipped();
                    return false;
                }
                slot.insert(self.start(key, refresh));
            }
            Entry::Vacant(slot) => {
                slot.insert(self.start(key, refresh));
            }
        }
        metrics::record_refresh_started();
        true
    }
}
