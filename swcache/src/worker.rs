//! The worker: one object owning every component.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use swcache_backend::CacheStorage;
use swcache_core::{Fetch, InterceptedRequest};
use tracing::{debug, error, info, instrument};

use crate::config::WorkerConfig;
use crate::context::Interception;
use crate::error::WorkerError;
use crate::fetch::BoundedFetch;
use crate::lifecycle::{ActivationReport, InstallReport, Lifecycle, LifecycleState};
use crate::maintenance::{Maintenance, SweepReport, SyncOutcome};
use crate::message::{MessageOutcome, WorkerMessage};
use crate::notification::{ClickResponse, Notification, resolve_click};
use crate::refresh::RefreshManager;
use crate::router::Router;
use crate::strategy::Strategies;

/// An event delivered to the worker by its host.
#[derive(Debug, Clone)]
pub enum Event {
    /// Provision the static assets.
    Install,
    /// Remove superseded namespaces and take control of open pages.
    Activate,
    /// A page requested a resource.
    Fetch(InterceptedRequest),
    /// The host's connectivity came back for a registered sync tag.
    Sync {
        /// Registered tag name.
        tag: String,
    },
    /// A push message arrived.
    Push,
    /// The user clicked the push notification.
    NotificationClick {
        /// The clicked button's id, `None` for the body.
        action: Option<String>,
    },
    /// A page posted a message.
    Message(Value),
}

/// Result of [`Worker::dispatch`], one variant per [`Event`].
#[derive(Debug, Clone)]
pub enum EventOutcome {
    /// Every static asset is stored.
    Installed(InstallReport),
    /// Superseded namespaces are gone.
    Activated(ActivationReport),
    /// How the request was answered.
    Fetched(Interception),
    /// What the sync request did.
    Synced(SyncOutcome),
    /// The notification to show.
    Notify(Notification),
    /// What the click does.
    Clicked(ClickResponse),
    /// What the message did.
    Message(MessageOutcome),
}

/// An offline caching proxy.
///
/// Owns the router, the lifecycle and the maintenance jobs, sharing one
/// storage and one fetcher between them. Requests are only intercepted once
/// the worker is activated; before that, and for non-`http(s)` requests,
/// [`handle_fetch`](Self::handle_fetch) returns [`Interception::Passthrough`].
///
/// ```ignore
/// let storage = MokaStorage::builder().max_entries(512).build();
/// let worker = Worker::new(config, storage, ReqwestFetch::default());
/// worker.install().await?;
/// worker.activate().await?;
///
/// let page = InterceptedRequest::get("https://cedodev.com/", Destination::Document)?;
/// let answer = worker.handle_fetch(&page).await?;
/// ```
pub struct Worker<S, F> {
    config: Arc<WorkerConfig>,
    router: Router<S, BoundedFetch<F>, RefreshManager>,
    lifecycle: Lifecycle<S, BoundedFetch<F>>,
    maintenance: Maintenance<S, BoundedFetch<F>>,
    refreshes: RefreshManager,
}

impl<S, F> fmt::Debug for Worker<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Worker")
            .field("lifecycle", &self.lifecycle)
            .field("refreshes", &self.refreshes)
            .finish_non_exhaustive()
    }
}

impl<S, F> Worker<S, F>
where
    S: CacheStorage + 'static,
    F: Fetch + 'static,
{
    /// Creates a worker in the [`LifecycleState::Parsed`] state.
    ///
    /// Every fetch the worker makes is bounded by the configured
    /// [`fetch_timeout`](WorkerConfig::fetch_timeout).
    pub fn new(config: WorkerConfig, storage: S, fetcher: F) -> Self {
        let fetcher = BoundedFetch::new(fetcher, config.fetch_timeout());
        let config = Arc::new(config);
        let storage = Arc::new(storage);
        let fetcher = Arc::new(fetcher);
        let refreshes = RefreshManager::new();

        let strategies = Strategies::new(
            Arc::clone(&config),
            Arc::clone(&storage),
            Arc::clone(&fetcher),
            refreshes.clone(),
        );
        Self {
            router: Router::new(strategies),
            lifecycle: Lifecycle::new(
                Arc::clone(&config),
                Arc::clone(&storage),
                Arc::clone(&fetcher),
            ),
            maintenance: Maintenance::new(Arc::clone(&config), storage, fetcher),
            refreshes,
            config,
        }
    }

    /// The validated configuration.
    pub fn config(&self) -> &WorkerConfig {
        &self.config
    }

    /// Current lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.lifecycle.state()
    }

    /// The router answering intercepted requests.
    pub fn router(&self) -> &Router<S, BoundedFetch<F>, RefreshManager> {
        &self.router
    }

    /// The manager running background refreshes.
    pub fn refreshes(&self) -> &RefreshManager {
        &self.refreshes
    }

    /// Provisions every static asset, or none of them.
    ///
    /// See [`Lifecycle::install`](crate::lifecycle::Lifecycle::install).
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        self.lifecycle.install().await
    }

    /// Removes superseded namespaces and starts intercepting requests.
    pub async fn activate(&self) -> Result<ActivationReport, WorkerError> {
        self.lifecycle.activate().await
    }

    /// Answers an intercepted request, or lets it through.
    pub async fn handle_fetch(
        &self,
        request: &InterceptedRequest,
    ) -> Result<Interception, WorkerError> {
        if !self.lifecycle.controls_clients() {
            debug!(
                request = %request.descriptor(),
                state = %self.state(),
                "not controlling pages yet"
            );
            return Ok(Interception::Passthrough);
        }
        self.router.route(request).await
    }

    /// Replays the sync request if `tag` is the registered one.
    pub async fn background_sync(&self, tag: &str) -> SyncOutcome {
        self.maintenance.background_sync(tag).await
    }

    /// Removes dynamic entries older than the configured maximum age.
    pub async fn sweep_expired(&self) -> Result<SweepReport, WorkerError> {
        self.maintenance.sweep_expired().await
    }

    /// Same as [`sweep_expired`](Self::sweep_expired), with a fixed clock.
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<SweepReport, WorkerError> {
        self.maintenance.sweep_expired_at(now).await
    }

    /// Builds the notification shown for a push.
    pub fn push(&self) -> Notification {
        self.push_at(Utc::now())
    }

    /// Same as [`push`](Self::push), stamped with `now`.
    pub fn push_at(&self, now: DateTime<Utc>) -> Notification {
        info!("push received");
        Notification::from_config(self.config.notification(), now)
    }

    /// Decides what a click on the notification does.
    pub fn notification_click(&self, action: Option<&str>) -> ClickResponse {
        resolve_click(self.config.notification(), action)
    }

    /// Handles a message posted by a page.
    ///
    /// Unknown messages are ignored. A failed sweep is logged, never returned.
    #[instrument(skip_all)]
    pub async fn message(&self, payload: &Value) -> MessageOutcome {
        match WorkerMessage::parse(payload) {
            Some(WorkerMessage::CleanCache) => match self.maintenance.sweep_expired().await {
                Ok(report) => MessageOutcome::Swept(report),
                Err(err) => {
                    error!(error = %err, "expiry sweep failed");
                    MessageOutcome::SweepFailed
                }
            },
            None => {
                debug!("ignoring unknown message");
                MessageOutcome::Ignored
            }
        }
    }

    /// Delivers any event.
    pub async fn dispatch(&self, event: Event) -> Result<EventOutcome, WorkerError> {
        let outcome = match event {
            Event::Install => EventOutcome::Installed(self.install().await?),
            Event::Activate => EventOutcome::Activated(self.activate().await?),
            Event::Fetch(request) => EventOutcome::Fetched(self.handle_fetch(&request).await?),
            Event::Sync { tag } => EventOutcome::Synced(self.background_sync(&tag).await),
            Event::Push => EventOutcome::Notify(self.push()),
            Event::NotificationClick { action } => {
                EventOutcome::Clicked(self.notification_click(action.as_deref()))
            }
            Event::Message(payload) => EventOutcome::Message(self.message(&payload).await),
        };
        Ok(outcome)
    }
}
