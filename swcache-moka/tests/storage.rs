//! Tests for the Moka-backed namespaces.

use http::StatusCode;
use swcache_backend::{CacheStorage, DeleteStatus, Namespace, StorageError};
use swcache_core::{NamespaceName, RequestDescriptor, ResponseSnapshot};
use swcache_moka::{MokaStorage, MokaStorageBuilder};

fn descriptor(id: u32) -> RequestDescriptor {
    RequestDescriptor::get(&format!("https://cedodev.com/assets/{id}")).unwrap()
}

fn snapshot(size: usize) -> ResponseSnapshot {
    ResponseSnapshot::builder(StatusCode::OK)
        .body(vec![0u8; size])
        .build()
}

#[tokio::test]
async fn open_is_idempotent_and_shares_entries() {
    let storage = MokaStorage::builder().max_entries(100).build();
    let name = NamespaceName::from("dynamic-v1.0");

    let first = storage.open(&name).await.unwrap();
    first.put(&descriptor(1), snapshot(10)).await.unwrap();

    let second = storage.open(&name).await.unwrap();
    assert!(second.lookup(&descriptor(1)).await.unwrap().is_some());
    assert_eq!(storage.names().await.unwrap(), vec![name]);
}

#[tokio::test]
async fn names_follow_creation_order() {
    let storage = MokaStorage::builder().max_entries(10).build();
    for name in ["cedodev-portfolio-v1.0", "static-v1.0", "dynamic-v1.0"] {
        storage.open(&NamespaceName::from(name)).await.unwrap();
    }

    let names: Vec<String> = storage
        .names()
        .await
        .unwrap()
        .into_iter()
        .map(|name| name.to_string())
        .collect();
    assert_eq!(
        names,
        vec!["cedodev-portfolio-v1.0", "static-v1.0", "dynamic-v1.0"]
    );
}

#[tokio::test]
async fn keys_and_delete() {
    let storage = MokaStorageBuilder::default().max_entries(100).build();
    let namespace = storage.open(&NamespaceName::from("static-v1.0")).await.unwrap();

    for id in 1..=3 {
        namespace.put(&descriptor(id), snapshot(1)).await.unwrap();
    }
    let mut keys: Vec<String> = namespace
        .keys()
        .await
        .unwrap()
        .iter()
        .map(|key| key.url().path().to_owned())
        .collect();
    keys.sort();
    assert_eq!(keys, vec!["/assets/1", "/assets/2", "/assets/3"]);

    assert_eq!(
        namespace.delete(&descriptor(2)).await.unwrap(),
        DeleteStatus::Deleted(1)
    );
    assert_eq!(
        namespace.delete(&descriptor(2)).await.unwrap(),
        DeleteStatus::Missing
    );
    assert_eq!(namespace.keys().await.unwrap().len(), 2);
}

#[tokio::test]
async fn deleted_namespace_rejects_writes() {
    let storage = MokaStorage::builder().max_entries(100).build();
    let name = NamespaceName::from("static-v0.9");
    let stale_handle = storage.open(&name).await.unwrap();
    stale_handle.put(&descriptor(1), snapshot(1)).await.unwrap();

    assert!(storage.delete_namespace(&name).await.unwrap());
    assert!(!storage.has(&name).await.unwrap());
    assert!(!storage.delete_namespace(&name).await.unwrap());

    assert!(stale_handle.lookup(&descriptor(1)).await.unwrap().is_none());
    assert!(matches!(
        stale_handle.put(&descriptor(2), snapshot(1)).await,
        Err(StorageError::NamespaceMissing(_))
    ));

    // Re-opening creates a fresh, empty namespace.
    let reopened = storage.open(&name).await.unwrap();
    assert!(reopened.keys().await.unwrap().is_empty());
}

#[tokio::test]
async fn entry_capacity_is_per_namespace() {
    let storage = MokaStorage::builder().max_entries(2).build();
    let a = storage.open(&NamespaceName::from("a")).await.unwrap();
    let b = storage.open(&NamespaceName::from("b")).await.unwrap();

    for id in 1..=2 {
        a.put(&descriptor(id), snapshot(1)).await.unwrap();
        b.put(&descriptor(id), snapshot(1)).await.unwrap();
    }
    a.cache().run_pending_tasks().await;
    b.cache().run_pending_tasks().await;

    assert_eq!(a.cache().entry_count(), 2);
    assert_eq!(b.cache().entry_count(), 2);
}

#[tokio::test]
async fn byte_capacity_evicts_oldest_entry() {
    let single = descriptor(1).memory_size() + snapshot(100).memory_size();
    let storage = MokaStorage::builder()
        .max_bytes((single * 3) as u64)
        .build();
    let namespace = storage.open(&NamespaceName::from("dynamic")).await.unwrap();

    for id in 1..=3 {
        namespace.put(&descriptor(id), snapshot(100)).await.unwrap();
    }
    namespace.cache().run_pending_tasks().await;
    for id in 1..=3 {
        assert!(namespace.lookup(&descriptor(id)).await.unwrap().is_some());
    }

    namespace.put(&descriptor(4), snapshot(100)).await.unwrap();
    namespace.cache().run_pending_tasks().await;

    let mut present = 0;
    for id in 1..=4 {
        if namespace.lookup(&descriptor(id)).await.unwrap().is_some() {
            present += 1;
        }
    }
    assert_eq!(present, 3);
}
