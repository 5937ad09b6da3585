//! Storage wrapper whose reads or writes of selected descriptors fail.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashSet;
use swcache::{
    CacheStorage, Namespace, NamespaceName, RequestDescriptor, ResponseSnapshot, StorageError,
};
use swcache_backend::{DeleteStatus, StorageResult};
use swcache_moka::{MokaNamespace, MokaStorage};

#[derive(Clone)]
pub struct FailingStorage {
    inner: MokaStorage,
    failing: Arc<DashSet<RequestDescriptor>>,
    unreadable: Arc<DashSet<RequestDescriptor>>,
}

impl FailingStorage {
    pub fn new(inner: MokaStorage) -> Self {
        Self {
            inner,
            failing: Arc::new(DashSet::new()),
            unreadable: Arc::new(DashSet::new()),
        }
    }

    /// Make every subsequent write to `descriptor` fail with a quota error.
    pub fn fail_writes_to(&self, descriptor: &RequestDescriptor) {
        self.failing.insert(descriptor.clone());
    }

    /// Make every subsequent lookup of `descriptor` fail with a backend error.
    pub fn fail_reads_of(&self, descriptor: &RequestDescriptor) {
        self.unreadable.insert(descriptor.clone());
    }
}

#[derive(Clone)]
pub struct FailingNamespace {
    inner: MokaNamespace,
    failing: Arc<DashSet<RequestDescriptor>>,
    unreadable: Arc<DashSet<RequestDescriptor>>,
}

#[async_trait]
impl Namespace for FailingNamespace {
    fn name(&self) -> &NamespaceName {
        self.inner.name()
    }

    async fn lookup(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<ResponseSnapshot>> {
        if self.unreadable.contains(descriptor) {
            return Err(StorageError::internal(std::io::Error::other("disk unavailable")));
        }
        self.inner.lookup(descriptor).await
    }

    async fn put(
        &self,
        descriptor: &RequestDescriptor,
        snapshot: ResponseSnapshot,
    ) -> StorageResult<()> {
        if self.failing.contains(descriptor) {
            return Err(StorageError::QuotaExceeded {
                namespace: self.name().clone(),
            });
        }
        self.inner.put(descriptor, snapshot).await
    }

    async fn delete(&self, descriptor: &RequestDescriptor) -> StorageResult<DeleteStatus> {
        self.inner.delete(descriptor).await
    }

    async fn keys(&self) -> StorageResult<Vec<RequestDescriptor>> {
        self.inner.keys().await
    }
}

#[async_trait]
impl CacheStorage for FailingStorage {
    type Namespace = FailingNamespace;

    async fn open(&self, name: &NamespaceName) -> StorageResult<FailingNamespace> {
        Ok(FailingNamespace {
            inner: self.inner.open(name).await?,
            failing: Arc::clone(&self.failing),
            unreadable: Arc::clone(&self.unreadable),
        })
    }

    async fn has(&self, name: &NamespaceName) -> StorageResult<bool> {
        self.inner.has(name).await
    }

    async fn names(&self) -> StorageResult<Vec<NamespaceName>> {
        self.inner.names().await
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> StorageResult<bool> {
        self.inner.delete_namespace(name).await
    }
}
