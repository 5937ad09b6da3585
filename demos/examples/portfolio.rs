//! Runs a worker against the live network.
//!
//! Loads a YAML configuration, provisions the static assets, activates and
//! answers a few requests through every route.
//!
//! Run:
//!   RUST_LOG=swcache=debug cargo run -p swcache-demos --example portfolio

use swcache::{Destination, InterceptedRequest, Interception, Worker, WorkerConfig};
use swcache_moka::MokaStorage;
use swcache_reqwest::ReqwestFetch;
use tracing_subscriber::EnvFilter;

const CONFIG: &str = r#"
origin: https://example.com/
static_namespace: static-demo-v1
dynamic_namespace: dynamic-demo-v1
static_assets:
  - /
network_first:
  - https://api.github.com/
offline_fallback: /
sync:
  tag: portfolio-sync
  endpoint: https://api.github.com/repos/rust-lang/rust
fetch_timeout: 10s
"#;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("swcache=info")),
        )
        .init();

    let config = WorkerConfig::from_yaml(CONFIG)?;
    let fetch = ReqwestFetch::default();
    let storage = MokaStorage::builder().max_bytes(32 * 1024 * 1024).build();
    let worker = Worker::new(config, storage, fetch);

    let installed = worker.install().await?;
    println!("installed {} assets", installed.assets);
    let activated = worker.activate().await?;
    println!("activated, removed {:?}", activated.removed);

    let requests = [
        InterceptedRequest::get("https://example.com/", Destination::Document)?,
        InterceptedRequest::get("https://example.com/", Destination::Document)?,
        InterceptedRequest::get("https://api.github.com/repos/rust-lang/rust", Destination::Empty)?,
        InterceptedRequest::get("https://example.com/favicon.ico", Destination::Image)?,
    ];
    for request in &requests {
        match worker.handle_fetch(request).await {
            Ok(Interception::Respond(outcome)) => println!(
                "{} -> {} from {}",
                request.descriptor(),
                outcome.response.status(),
                outcome.source.as_str()
            ),
            Ok(Interception::Passthrough) => println!("{} -> passthrough", request.descriptor()),
            Err(err) => println!("{} -> {err}", request.descriptor()),
        }
    }

    println!("sync: {:?}", worker.background_sync("portfolio-sync").await);
    println!("sweep: {}", worker.sweep_expired().await?);

    worker.refreshes().settle().await;
    Ok(())
}
