//! Moka storage implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use swcache_backend::{CacheStorage, DeleteStatus, Namespace, StorageError, StorageResult};
use swcache_core::{NamespaceName, RequestDescriptor, ResponseSnapshot};
use tracing::debug;

use crate::builder::{CacheFactory, MokaStorageBuilder, NoCapacity};

/// In-memory cache storage powered by Moka.
///
/// Cloning is cheap: clones share the same namespaces.
///
/// # Caveats
///
/// - Data is **not persisted**: every namespace is lost on process restart,
///   so the static namespace must be provisioned again by an install.
/// - Capacity is enforced **per namespace**. Once a namespace is full, Moka
///   evicts entries according to the configured [`EvictionPolicy`], and that
///   includes pre-provisioned static assets. Size the capacity to hold at
///   least the whole static asset list.
///
/// [`EvictionPolicy`]: moka::policy::EvictionPolicy
#[derive(Clone)]
pub struct MokaStorage {
    inner: Arc<StorageInner>,
}

struct StorageInner {
    namespaces: DashMap<NamespaceName, MokaNamespace>,
    sequence: AtomicU64,
    factory: CacheFactory,
}

impl std::fmt::Debug for MokaStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStorage")
            .field("namespaces", &self.inner.namespaces.len())
            .field("factory", &self.inner.factory)
            .finish()
    }
}

impl MokaStorage {
    /// Creates a new builder. Capacity must be configured before `build()`.
    pub fn builder() -> MokaStorageBuilder<NoCapacity> {
        MokaStorageBuilder::new()
    }

    pub(crate) fn from_factory(factory: CacheFactory) -> Self {
        MokaStorage {
            inner: Arc::new(StorageInner {
                namespaces: DashMap::new(),
                sequence: AtomicU64::new(0),
                factory,
            }),
        }
    }
}

#[async_trait]
impl CacheStorage for MokaStorage {
    type Namespace = MokaNamespace;

    async fn open(&self, name: &NamespaceName) -> StorageResult<MokaNamespace> {
        let namespace = self
            .inner
            .namespaces
            .entry(name.clone())
            .or_insert_with(|| {
                debug!(namespace = %name, "creating namespace");
                MokaNamespace {
                    name: name.clone(),
                    sequence: self.inner.sequence.fetch_add(1, Ordering::Relaxed),
                    cache: self.inner.factory.build(),
                    deleted: Arc::new(AtomicBool::new(false)),
                }
            });
        Ok(namespace.clone())
    }

    async fn has(&self, name: &NamespaceName) -> StorageResult<bool> {
        Ok(self.inner.namespaces.contains_key(name))
    }

    async fn names(&self) -> StorageResult<Vec<NamespaceName>> {
        let mut names: Vec<(u64, NamespaceName)> = self
            .inner
            .namespaces
            .iter()
            .map(|entry| (entry.value().sequence, entry.key().clone()))
            .collect();
        names.sort_unstable_by_key(|(sequence, _)| *sequence);
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> StorageResult<bool> {
        match self.inner.namespaces.remove(name) {
            Some((_, namespace)) => {
                namespace.deleted.store(true, Ordering::Release);
                namespace.cache.invalidate_all();
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

/// Handle to one namespace of a [`MokaStorage`].
///
/// Writes through a handle whose namespace has since been deleted fail with
/// [`StorageError::NamespaceMissing`]; reads see an empty namespace.
#[derive(Clone)]
pub struct MokaNamespace {
    name: NamespaceName,
    sequence: u64,
    cache: Cache<RequestDescriptor, ResponseSnapshot>,
    deleted: Arc<AtomicBool>,
}

impl std::fmt::Debug for MokaNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaNamespace")
            .field("name", &self.name)
            .field("cache", &self.cache)
            .finish()
    }
}

impl MokaNamespace {
    /// Returns the underlying Moka cache.
    pub fn cache(&self) -> &Cache<RequestDescriptor, ResponseSnapshot> {
        &self.cache
    }

    fn ensure_live(&self) -> StorageResult<()> {
        if self.deleted.load(Ordering::Acquire) {
            Err(StorageError::NamespaceMissing(self.name.clone()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Namespace for MokaNamespace {
    fn name(&self) -> &NamespaceName {
        &self.name
    }

    async fn lookup(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<ResponseSnapshot>> {
        Ok(self.cache.get(descriptor).await)
    }

    async fn put(
        &self,
        descriptor: &RequestDescriptor,
        snapshot: ResponseSnapshot,
    ) -> StorageResult<()> {
        self.ensure_live()?;
        self.cache.insert(descriptor.clone(), snapshot).await;
        Ok(())
    }

    async fn delete(&self, descriptor: &RequestDescriptor) -> StorageResult<DeleteStatus> {
        match self.cache.remove(descriptor).await {
            Some(_) => Ok(DeleteStatus::Deleted(1)),
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn keys(&self) -> StorageResult<Vec<RequestDescriptor>> {
        Ok(self
            .cache
            .iter()
            .map(|(descriptor, _)| RequestDescriptor::clone(&descriptor))
            .collect())
    }
}
