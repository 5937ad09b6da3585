//! Shows the offline behavior with a fetcher that can be switched off.
//!
//! Run:
//!   cargo run -p swcache-demos --example offline

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use http::StatusCode;
use swcache::{
    Destination, Fetch, FetchError, InterceptedRequest, ResponseSnapshot, Worker, WorkerConfig,
};
use swcache_moka::MokaStorage;

/// Answers every request with its own URL until switched off.
#[derive(Clone, Default)]
struct Switchable {
    offline: Arc<AtomicBool>,
}

#[async_trait]
impl Fetch for Switchable {
    async fn fetch(&self, request: &InterceptedRequest) -> Result<ResponseSnapshot, FetchError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::offline("network switched off"));
        }
        Ok(ResponseSnapshot::builder(StatusCode::OK)
            .date(Utc::now())
            .body(request.url().to_string())
            .build())
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt().with_env_filter("swcache=debug").init();

    let fetch = Switchable::default();
    let config = WorkerConfig::builder().origin("https://cedodev.com/").build()?;
    let storage = MokaStorage::builder().max_entries(256).build();
    let worker = Worker::new(config, storage, fetch.clone());
    worker.install().await?;
    worker.activate().await?;

    let repos = InterceptedRequest::get(
        "https://api.github.com/users/ogkauann/repos",
        Destination::Empty,
    )?;
    let page = InterceptedRequest::get("https://cedodev.com/projects/", Destination::Iframe)?;

    worker.handle_fetch(&repos).await?;
    fetch.offline.store(true, Ordering::SeqCst);

    for request in [&repos, &page] {
        let answer = worker.handle_fetch(request).await?;
        if let Some(outcome) = answer.outcome() {
            println!(
                "offline {} -> {:?}: {}",
                request.descriptor(),
                outcome.source,
                String::from_utf8_lossy(outcome.response.body())
            );
        }
    }
    Ok(())
}
