#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Worker configuration: namespace names, static assets, routing patterns.
///
/// Loaded from YAML with [`WorkerConfig::from_yaml`] or assembled with
/// [`WorkerConfig::builder`]. Defaults reproduce the portfolio deployment.
pub mod config;

/// Response provenance and interception results.
pub mod context;

/// Error types for worker operations.
pub mod error;

/// Live fetches bounded by the configured timeout.
pub mod fetch;

/// Install and activation.
pub mod lifecycle;

/// Background sync and the expiry sweep.
pub mod maintenance;

/// Page-to-worker messages.
pub mod message;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, counters and histograms are
/// recorded for answered and failed requests, expired entries, removed
/// namespaces and background refreshes.
pub mod metrics;

/// Push notifications and their click handling.
pub mod notification;

/// Background refreshes for stale-while-revalidate.
pub mod refresh;

/// Picks a strategy per request.
pub mod router;

/// Cache-first, network-first, stale-while-revalidate and the default route.
pub mod strategy;

mod worker;

pub use config::{ConfigError, ConfigFile, WorkerConfig, WorkerConfigBuilder};
pub use context::{Interception, Outcome, ResponseSource};
pub use error::{InstallCause, WorkerError};
pub use fetch::BoundedFetch;
pub use lifecycle::{ActivationReport, InstallReport, LifecycleState};
pub use maintenance::{SweepReport, SyncOutcome};
pub use message::{MessageOutcome, WorkerMessage};
pub use notification::{ClickResponse, Notification, NotificationConfig};
pub use refresh::RefreshManager;
pub use router::Route;
pub use worker::{Event, EventOutcome, Worker};

pub use swcache_backend::{CacheStorage, Namespace, StorageError};
pub use swcache_core::{
    Destination, Fetch, FetchError, InterceptedRequest, NamespaceName, RequestDescriptor,
    RequestMode, ResponseSnapshot,
};
