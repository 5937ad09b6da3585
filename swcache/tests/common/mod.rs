#![allow(dead_code)]

pub mod failing_storage;
pub mod mock_fetch;

use chrono::Utc;
use http::StatusCode;
use swcache::{
    CacheStorage, Destination, InterceptedRequest, ResponseSnapshot, Worker, WorkerConfig,
};
use swcache_moka::MokaStorage;

pub use failing_storage::FailingStorage;
pub use mock_fetch::MockFetch;

pub const ORIGIN: &str = "https://cedodev.com/";
pub const GITHUB_REPOS: &str = "https://api.github.com/users/ogkauann/repos";

/// The default deployment served from [`ORIGIN`].
pub fn config() -> WorkerConfig {
    WorkerConfig::builder().origin(ORIGIN).build().unwrap()
}

pub fn storage() -> MokaStorage {
    MokaStorage::builder().max_entries(1_000).build()
}

/// A dated 200 response with `body`.
pub fn ok(body: &str) -> ResponseSnapshot {
    ResponseSnapshot::builder(StatusCode::OK)
        .date(Utc::now())
        .header("content-type", "text/plain")
        .body(body.to_owned())
        .build()
}

pub fn status(status: StatusCode) -> ResponseSnapshot {
    ResponseSnapshot::builder(status).body("error").build()
}

/// Resolves `path` against the origin.
pub fn url(path: &str) -> String {
    ::url::Url::parse(ORIGIN).unwrap().join(path).unwrap().to_string()
}

pub fn request(path: &str, destination: Destination) -> InterceptedRequest {
    InterceptedRequest::get(&url(path), destination).unwrap()
}

/// A fetcher answering every static asset of `config` with its own URL.
pub fn serving_static_assets(config: &WorkerConfig) -> MockFetch {
    let fetch = MockFetch::new();
    for asset in config.static_assets() {
        fetch.respond(asset.url().as_str(), ok(asset.url().as_str()));
    }
    fetch
}

pub fn body(snapshot: &ResponseSnapshot) -> String {
    String::from_utf8(snapshot.body().to_vec()).unwrap()
}

/// An installed and activated worker over shared handles.
pub async fn active_worker() -> (Worker<MokaStorage, MockFetch>, MokaStorage, MockFetch) {
    let storage = storage();
    let (worker, fetch) = activate(config(), storage.clone()).await;
    (worker, storage, fetch)
}

/// Installs and activates a worker for `config` over `storage`.
pub async fn activate<S>(config: WorkerConfig, storage: S) -> (Worker<S, MockFetch>, MockFetch)
where
    S: CacheStorage + 'static,
{
    let fetch = serving_static_assets(&config);
    let worker = Worker::new(config, storage, fetch.clone());
    worker.install().await.unwrap();
    worker.activate().await.unwrap();
    fetch.reset_calls();
    (worker, fetch)
}
