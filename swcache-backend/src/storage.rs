use std::sync::Arc;

use async_trait::async_trait;
use swcache_core::{NamespaceName, RequestDescriptor, ResponseSnapshot};
use tracing::warn;

use crate::{DeleteStatus, StorageError};

/// Result alias for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// A handle to one opened namespace.
///
/// Single-entry operations are atomic. Nothing orders two concurrent writes
/// to the same descriptor: the last one to land wins.
#[async_trait]
pub trait Namespace: Send + Sync {
    /// Name of this namespace.
    fn name(&self) -> &NamespaceName;

    /// Look up the snapshot stored under `descriptor`.
    async fn lookup(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<ResponseSnapshot>>;

    /// Store `snapshot` under `descriptor`, replacing any previous one.
    async fn put(
        &self,
        descriptor: &RequestDescriptor,
        snapshot: ResponseSnapshot,
    ) -> StorageResult<()>;

    /// Remove the entry stored under `descriptor`.
    async fn delete(&self, descriptor: &RequestDescriptor) -> StorageResult<DeleteStatus>;

    /// All descriptors currently stored.
    async fn keys(&self) -> StorageResult<Vec<RequestDescriptor>>;

    /// Store every entry or none of them.
    ///
    /// The default implementation writes entries one by one and, if a write
    /// fails, restores every entry it already touched to its previous state
    /// before returning the error.
    async fn put_all(
        &self,
        entries: Vec<(RequestDescriptor, ResponseSnapshot)>,
    ) -> StorageResult<()> {
        let mut touched: Vec<(RequestDescriptor, Option<ResponseSnapshot>)> =
            Vec::with_capacity(entries.len());

        for (descriptor, snapshot) in entries {
            let write = match self.lookup(&descriptor).await {
                Ok(previous) => self.put(&descriptor, snapshot).await.map(|()| previous),
                Err(err) => Err(err),
            };
            match write {
                Ok(previous) => touched.push((descriptor, previous)),
                Err(err) => {
                    rollback(self, touched).await;
                    return Err(err);
                }
            }
        }
        Ok(())
    }
}

async fn rollback<N>(namespace: &N, touched: Vec<(RequestDescriptor, Option<ResponseSnapshot>)>)
where
    N: Namespace + ?Sized,
{
    for (descriptor, previous) in touched.into_iter().rev() {
        let restored = match previous {
            Some(snapshot) => namespace.put(&descriptor, snapshot).await,
            None => namespace.delete(&descriptor).await.map(|_| ()),
        };
        if let Err(error) = restored {
            warn!(namespace = %namespace.name(), %descriptor, %error, "rollback failed");
        }
    }
}

/// A registry of named namespaces.
#[async_trait]
pub trait CacheStorage: Send + Sync {
    /// Handle type returned by [`open`](Self::open).
    type Namespace: Namespace + Clone + 'static;

    /// Open the namespace called `name`, creating it if absent.
    async fn open(&self, name: &NamespaceName) -> StorageResult<Self::Namespace>;

    /// Returns `true` if a namespace called `name` exists.
    async fn has(&self, name: &NamespaceName) -> StorageResult<bool>;

    /// Names of every existing namespace, in creation order.
    async fn names(&self) -> StorageResult<Vec<NamespaceName>>;

    /// Delete a whole namespace. Returns `false` if it did not exist.
    async fn delete_namespace(&self, name: &NamespaceName) -> StorageResult<bool>;

    /// Look `descriptor` up in every namespace, in creation order.
    ///
    /// Returns the first hit along with the namespace it came from.
    async fn lookup_any(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<(NamespaceName, ResponseSnapshot)>> {
        for name in self.names().await? {
            let namespace = self.open(&name).await?;
            if let Some(snapshot) = namespace.lookup(descriptor).await? {
                return Ok(Some((name, snapshot)));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<T> CacheStorage for Arc<T>
where
    T: CacheStorage + ?Sized,
{
    type Namespace = T::Namespace;

    async fn open(&self, name: &NamespaceName) -> StorageResult<Self::Namespace> {
        (**self).open(name).await
    }

    async fn has(&self, name: &NamespaceName) -> StorageResult<bool> {
        (**self).has(name).await
    }

    async fn names(&self) -> StorageResult<Vec<NamespaceName>> {
        (**self).names().await
    }

    async fn delete_namespace(&self, name: &NamespaceName) -> StorageResult<bool> {
        (**self).delete_namespace(name).await
    }

    async fn lookup_any(
        &self,
        descriptor: &RequestDescriptor,
    ) -> StorageResult<Option<(NamespaceName, ResponseSnapshot)>> {
        (**self).lookup_any(descriptor).await
    }
}
