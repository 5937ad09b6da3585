//! Simple in-memory test storage using DashMap.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::{DashMap, DashSet};
use swcache_backend::{CacheStorage, DeleteStatus, Namespace, StorageError, StorageResult};
use swcache_core::{NamespaceName, RequestDescriptor, ResponseSnapshot};

/// Namespace backed by a DashMap, with writes to selected descriptors failing.
#[derive(Clone, Default)]
pub struct TestNamespace {
    name: NamespaceName,
    entries: Arc<DashMap<RequestDescriptor, ResponseSnapshot>>,
    failing: Arc<DashSet<RequestDescriptor>>,
}

impl TestNamespace {
    /// Make every subsequent write to `descriptor` fail with a quota error.
    pub fn fail_writes_to(&self, descriptor: &RequestDescriptor) {
        self.failing.insert(descriptor.clone());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[async_trait]
impl Namespace for TestNamespace {
    fn name(&self) -> &NamespaceName {
        &self.name
    }

    async fn lookup(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<ResponseSnapshot>> {
        Ok(self.entries.get(descriptor).map(|v| v.clone()))
    }

    async fn put(
        &self,
        descriptor: &RequestDescriptor,
        snapshot: ResponseSnapshot,
    ) -> StorageResult<()> {
        if self.failing.contains(descriptor) {
            return Err(StorageError::QuotaExceeded {
                namespace: self.name.clone(),
            });
        }
        self.entries.insert(descriptor.clone(), snapshot);
        Ok(())
    }

    async fn delete(&self, descriptor: &RequestDescriptor) -> StorageResult<DeleteStatus> {
        Ok(match self.entries.remove(descriptor) {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    async fn keys(&self) -> StorageResult<Vec<RequestDescriptor>> {
        Ok(self.entries.iter().map(|e| e.key().clone()).collect())
    }
}

/// Storage keeping namespaces in creation order.
#[derive(Clone, Default)]
pub struct TestStorage {
    namespaces: Arc<DashMap<NamespaceName, (u64, TestNamespace)>>,
    counter: Arc<AtomicU64>,
}

#[async_trait]
impl CacheStorage for TestStorage {
    type Namespace = TestNamespace;

    async fn open(&self, name: &NamespaceName) -> StorageResult<TestNamespace> {
        let entry = self.namespaces.entry(name.clone()).or_insert_with(|| {
            let seq = self.counter.fetch_add(1, Ordering::SeqCst);
            (
                seq,
                TestNamespace {
                    name: name.clone(),
                    ..TestNamespace::default()
                },
            )
        });
        Ok(entry.1.clone())
    }

    async fn has(&self, name: &NamespaceName) -> StorageResult<bool> {
        Ok(self.namespaces.contains_key(name))
    }

    async fn names(&self) -> StorageResult<Vec<NamespaceName>> {
        let mut names: Vec<(u64, NamespaceName)> = self
            .namespaces
            .iter()
            .map(|e| (e.value().0, e.key().clone()))
            .collect();
        names.sort();
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> StorageResult<bool> {
        Ok(self.namespaces.remove(name).is_some())
    }
}
