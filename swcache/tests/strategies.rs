//! Strategy behavior through the worker.

mod common;

use std::time::Duration;

use common::{
    FailingStorage, GITHUB_REPOS, ORIGIN, activate, active_worker, body, config, ok, request,
    status, storage, url,
};
use http::{Method, StatusCode};
use pretty_assertions::assert_eq;
use swcache::{
    CacheStorage, Destination, FetchError, InterceptedRequest, Namespace, NamespaceName,
    RequestDescriptor, RequestMode, ResponseSource, StorageError, WorkerConfig, WorkerError,
};

fn static_ns() -> NamespaceName {
    NamespaceName::from("static-v1.0")
}

fn dynamic_ns() -> NamespaceName {
    NamespaceName::from("dynamic-v1.0")
}

#[tokio::test]
async fn network_first_ignores_entries_in_other_namespaces() {
    let (worker, storage, fetch) = active_worker().await;
    let github = InterceptedRequest::get(GITHUB_REPOS, Destination::Empty).unwrap();
    let descriptor = github.descriptor().clone();

    storage
        .open(&static_ns())
        .await
        .unwrap()
        .put(&descriptor, ok("static copy"))
        .await
        .unwrap();
    fetch.respond(GITHUB_REPOS, ok("live repos"));

    let outcome = worker.handle_fetch(&github).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Network);
    assert_eq!(body(&outcome.response), "live repos");
    assert_eq!(fetch.calls(GITHUB_REPOS), 1);

    let stored = storage.open(&dynamic_ns()).await.unwrap().lookup(&descriptor).await.unwrap();
    assert_eq!(body(&stored.unwrap()), "live repos");
}

#[tokio::test]
async fn offline_api_request_falls_back_to_dynamic_snapshot() {
    let (worker, _storage, fetch) = active_worker().await;
    let github = InterceptedRequest::get(GITHUB_REPOS, Destination::Empty).unwrap();

    fetch.respond(GITHUB_REPOS, ok("[\"portfolio\"]"));
    worker.handle_fetch(&github).await.unwrap();

    fetch.set_offline(true);
    let outcome = worker.handle_fetch(&github).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache(dynamic_ns()));
    assert_eq!(body(&outcome.response), "[\"portfolio\"]");
}

#[tokio::test]
async fn network_first_failure_status_falls_back_without_storing() {
    let (worker, storage, fetch) = active_worker().await;
    let github = InterceptedRequest::get(GITHUB_REPOS, Destination::Empty).unwrap();
    let descriptor = github.descriptor().clone();

    fetch.respond(GITHUB_REPOS, ok("good"));
    worker.handle_fetch(&github).await.unwrap();

    fetch.respond(GITHUB_REPOS, status(StatusCode::SERVICE_UNAVAILABLE));
    let outcome = worker.handle_fetch(&github).await.unwrap().into_outcome().unwrap();
    assert_eq!(body(&outcome.response), "good");
    assert!(outcome.source.is_cached());

    let stored = storage.open(&dynamic_ns()).await.unwrap().lookup(&descriptor).await.unwrap();
    assert_eq!(stored.unwrap().status(), StatusCode::OK);
}

#[tokio::test]
async fn network_first_miss_while_offline_is_unavailable() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);
    let form =
        InterceptedRequest::get("https://formspree.io/f/contact", Destination::Empty).unwrap();

    assert!(matches!(
        worker.handle_fetch(&form).await,
        Err(WorkerError::Unavailable(_))
    ));
}

#[tokio::test]
async fn cache_first_serves_provisioned_assets_without_network() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);

    let outcome = worker
        .handle_fetch(&request("/styles.css", Destination::Style))
        .await
        .unwrap()
        .into_outcome()
        .unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache(static_ns()));
    assert_eq!(body(&outcome.response), url("/styles.css"));
    assert_eq!(fetch.total_calls(), 0);
}

#[tokio::test]
async fn cache_first_stores_only_successful_misses() {
    let (worker, storage, fetch) = active_worker().await;
    let logo = request("/logo.png", Destination::Image);
    let missing = request("/missing.png", Destination::Image);
    fetch.respond(&url("/logo.png"), ok("png"));

    let first = worker.handle_fetch(&logo).await.unwrap().into_outcome().unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    let second = worker.handle_fetch(&logo).await.unwrap().into_outcome().unwrap();
    assert_eq!(second.source, ResponseSource::Cache(static_ns()));
    assert_eq!(fetch.calls(&url("/logo.png")), 1);

    let not_found = worker.handle_fetch(&missing).await.unwrap().into_outcome().unwrap();
    assert_eq!(not_found.response.status(), StatusCode::NOT_FOUND);
    let namespace = storage.open(&static_ns()).await.unwrap();
    assert!(namespace.lookup(missing.descriptor()).await.unwrap().is_none());
}

#[tokio::test]
async fn cache_first_miss_while_offline_propagates_network_error() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);
    assert!(matches!(
        worker.handle_fetch(&request("/app.js", Destination::Script)).await,
        Err(WorkerError::Network(_))
    ));
}

#[tokio::test]
async fn stale_while_revalidate_serves_old_content_until_refresh_settles() {
    let (worker, storage, fetch) = active_worker().await;
    let about = request("/about.html", Destination::Document);
    let about_url = url("/about.html");

    fetch.respond(&about_url, ok("v1"));
    let first = worker.handle_fetch(&about).await.unwrap().into_outcome().unwrap();
    assert_eq!(first.source, ResponseSource::Network);
    assert_eq!(body(&first.response), "v1");

    fetch.respond(&about_url, ok("v2"));
    let gate = fetch.gate(&about_url);

    let stale = worker.handle_fetch(&about).await.unwrap().into_outcome().unwrap();
    assert_eq!(stale.source, ResponseSource::Cache(dynamic_ns()));
    assert_eq!(body(&stale.response), "v1");

    let namespace = storage.open(&dynamic_ns()).await.unwrap();
    let stored = namespace.lookup(about.descriptor()).await.unwrap().unwrap();
    assert_eq!(body(&stored), "v1");

    gate.notify_one();
    worker.refreshes().settle().await;

    let stored = namespace.lookup(about.descriptor()).await.unwrap().unwrap();
    assert_eq!(body(&stored), "v2");

    gate.notify_one();
    let fresh = worker.handle_fetch(&about).await.unwrap().into_outcome().unwrap();
    assert_eq!(body(&fresh.response), "v2");
    worker.refreshes().settle().await;
}

#[tokio::test]
async fn concurrent_hits_share_one_refresh() {
    let (worker, _storage, fetch) = active_worker().await;
    let about = request("/about.html", Destination::Document);
    let about_url = url("/about.html");

    fetch.respond(&about_url, ok("v1"));
    worker.handle_fetch(&about).await.unwrap();
    let gate = fetch.gate(&about_url);

    for _ in 0..3 {
        worker.handle_fetch(&about).await.unwrap();
    }
    // Let the single refresh reach the gate.
    tokio::task::yield_now().await;

    gate.notify_one();
    worker.refreshes().settle().await;
    assert_eq!(fetch.calls(&about_url), 2);
}

#[tokio::test]
async fn failed_refresh_keeps_the_stored_snapshot() {
    let (worker, storage, fetch) = active_worker().await;
    let about = request("/about.html", Destination::Document);
    let about_url = url("/about.html");

    fetch.respond(&about_url, ok("v1"));
    worker.handle_fetch(&about).await.unwrap();

    fetch.respond(&about_url, status(StatusCode::BAD_GATEWAY));
    let outcome = worker.handle_fetch(&about).await.unwrap().into_outcome().unwrap();
    assert_eq!(body(&outcome.response), "v1");
    worker.refreshes().settle().await;

    fetch.set_offline(true);
    worker.handle_fetch(&about).await.unwrap();
    worker.refreshes().settle().await;

    let namespace = storage.open(&dynamic_ns()).await.unwrap();
    let stored = namespace.lookup(about.descriptor()).await.unwrap().unwrap();
    assert_eq!(body(&stored), "v1");
}

#[tokio::test]
async fn default_route_reads_every_namespace() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);

    // The favicon was provisioned into the static namespace; a manifest-style
    // request for it still finds it.
    let favicon = request("/favicon.svg", Destination::Manifest);
    let outcome = worker.handle_fetch(&favicon).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache(static_ns()));
}

#[tokio::test]
async fn default_route_does_not_store_network_answers() {
    let (worker, storage, fetch) = active_worker().await;
    let manifest = request("/manifest.json", Destination::Manifest);
    fetch.respond(&url("/manifest.json"), ok("{}"));

    let outcome = worker.handle_fetch(&manifest).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Network);
    assert!(storage.lookup_any(manifest.descriptor()).await.unwrap().is_none());
}

#[tokio::test]
async fn offline_navigation_gets_the_root_document() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);

    let frame = request("/embed/projects", Destination::Iframe).with_mode(RequestMode::Navigate);
    let outcome = worker.handle_fetch(&frame).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Fallback(static_ns()));
    assert_eq!(body(&outcome.response), url("/index.html"));
}

#[tokio::test]
async fn offline_subresource_is_unavailable() {
    let (worker, _storage, fetch) = active_worker().await;
    fetch.set_offline(true);

    let data = request("/data/projects.json", Destination::Empty);
    match worker.handle_fetch(&data).await {
        Err(WorkerError::Unavailable(descriptor)) => {
            assert_eq!(descriptor, RequestDescriptor::get(&url("/data/projects.json")).unwrap())
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn form_submissions_are_never_stored_or_replayed() {
    let (worker, storage, fetch) = active_worker().await;
    let contact = "https://formspree.io/f/contact";
    let descriptor = RequestDescriptor::new(Method::POST, ::url::Url::parse(contact).unwrap());
    let submit = InterceptedRequest::new(descriptor.clone(), Destination::Empty);
    fetch.respond(contact, ok("thanks"));

    let outcome = worker.handle_fetch(&submit).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Network);
    assert_eq!(body(&outcome.response), "thanks");
    assert!(storage.lookup_any(&descriptor).await.unwrap().is_none());

    fetch.set_offline(true);
    match worker.handle_fetch(&submit).await {
        Err(WorkerError::Unavailable(unavailable)) => assert_eq!(unavailable, descriptor),
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn rejected_form_submission_is_returned_as_is() {
    let (worker, storage, fetch) = active_worker().await;
    let contact = "https://formspree.io/f/contact";
    let descriptor = RequestDescriptor::new(Method::POST, ::url::Url::parse(contact).unwrap());
    fetch.respond(contact, status(StatusCode::UNPROCESSABLE_ENTITY));

    let submit = InterceptedRequest::new(descriptor.clone(), Destination::Empty);
    let outcome = worker.handle_fetch(&submit).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert!(storage.lookup_any(&descriptor).await.unwrap().is_none());
}

#[tokio::test]
async fn stale_while_revalidate_miss_while_offline_propagates_network_error() {
    let (worker, storage, fetch) = active_worker().await;
    fetch.set_offline(true);
    let projects = request("/projects.html", Destination::Document);

    assert!(matches!(
        worker.handle_fetch(&projects).await,
        Err(WorkerError::Network(_))
    ));
    let namespace = storage.open(&dynamic_ns()).await.unwrap();
    assert!(namespace.lookup(projects.descriptor()).await.unwrap().is_none());
}

#[tokio::test]
async fn cache_first_write_failure_propagates() {
    let failing = FailingStorage::new(storage());
    let (worker, fetch) = activate(config(), failing.clone()).await;
    let logo = request("/logo.png", Destination::Image);
    fetch.respond(&url("/logo.png"), ok("png"));
    failing.fail_writes_to(logo.descriptor());

    match worker.handle_fetch(&logo).await {
        Err(WorkerError::Storage(StorageError::QuotaExceeded { namespace })) => {
            assert_eq!(namespace, static_ns())
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn network_first_write_failure_propagates() {
    let failing = FailingStorage::new(storage());
    let (worker, fetch) = activate(config(), failing.clone()).await;
    let github = InterceptedRequest::get(GITHUB_REPOS, Destination::Empty).unwrap();
    fetch.respond(GITHUB_REPOS, ok("repos"));
    failing.fail_writes_to(github.descriptor());

    match worker.handle_fetch(&github).await {
        Err(WorkerError::Storage(StorageError::QuotaExceeded { namespace })) => {
            assert_eq!(namespace, dynamic_ns())
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn default_route_read_failure_propagates() {
    let failing = FailingStorage::new(storage());
    let (worker, fetch) = activate(config(), failing.clone()).await;
    let manifest = request("/manifest.json", Destination::Manifest);
    fetch.respond(&url("/manifest.json"), ok("{}"));
    failing.fail_reads_of(manifest.descriptor());

    assert!(matches!(
        worker.handle_fetch(&manifest).await,
        Err(WorkerError::Storage(StorageError::Internal(_)))
    ));
    assert_eq!(fetch.calls(&url("/manifest.json")), 0);
}

fn bounded_config() -> WorkerConfig {
    WorkerConfig::builder()
        .origin(ORIGIN)
        .fetch_timeout(Duration::from_millis(50))
        .build()
        .unwrap()
}

#[tokio::test]
async fn hung_fetch_on_a_miss_times_out() {
    let (worker, fetch) = activate(bounded_config(), storage()).await;
    let _gate = fetch.gate(&url("/slow.js"));

    match worker.handle_fetch(&request("/slow.js", Destination::Script)).await {
        Err(WorkerError::Network(FetchError::Timeout(limit))) => {
            assert_eq!(limit, Duration::from_millis(50))
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[tokio::test]
async fn hung_network_first_fetch_falls_back_after_the_timeout() {
    let storage = storage();
    let (worker, fetch) = activate(bounded_config(), storage.clone()).await;
    let github = InterceptedRequest::get(GITHUB_REPOS, Destination::Empty).unwrap();
    fetch.respond(GITHUB_REPOS, ok("cached repos"));
    worker.handle_fetch(&github).await.unwrap();

    let _gate = fetch.gate(GITHUB_REPOS);
    let outcome = worker.handle_fetch(&github).await.unwrap().into_outcome().unwrap();
    assert_eq!(outcome.source, ResponseSource::Cache(dynamic_ns()));
    assert_eq!(body(&outcome.response), "cached repos");
}

#[tokio::test]
async fn hung_refresh_is_abandoned_after_the_timeout() {
    let storage = storage();
    let (worker, fetch) = activate(bounded_config(), storage.clone()).await;
    let about = request("/about.html", Destination::Document);
    fetch.respond(&url("/about.html"), ok("v1"));
    worker.handle_fetch(&about).await.unwrap();

    fetch.respond(&url("/about.html"), ok("v2"));
    let _gate = fetch.gate(&url("/about.html"));
    worker.handle_fetch(&about).await.unwrap();

    assert!(worker.refreshes().settle_within(Duration::from_secs(5)).await);
    let namespace = storage.open(&dynamic_ns()).await.unwrap();
    let stored = namespace.lookup(about.descriptor()).await.unwrap().unwrap();
    assert_eq!(body(&stored), "v1");
}
