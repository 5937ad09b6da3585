//! Install and activation.
//!
//! A worker moves through
//! `Parsed → Installing → Installed → Activating → Activated`. A failed
//! install makes it `Redundant`; it never serves requests after that.
//!
//! Install provisions every static asset or none of them. Activation deletes
//! every namespace that is not live, which is how a version bump of the
//! namespace names discards the previous version's entries.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};

use futures::future::try_join_all;
use swcache_backend::{CacheStorage, Namespace};
use swcache_core::{
    Fetch, InterceptedRequest, NamespaceName, RequestDescriptor, ResponseSnapshot,
};
use tracing::{debug, error, info, instrument, warn};

use crate::config::WorkerConfig;
use crate::error::{InstallCause, WorkerError};
use crate::metrics;

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum LifecycleState {
    /// Built, install not started.
    Parsed = 0,
    /// Static assets are being fetched.
    Installing = 1,
    /// Every static asset is stored; waiting for activation.
    Installed = 2,
    /// Superseded namespaces are being removed.
    Activating = 3,
    /// Serving requests.
    Activated = 4,
    /// Install failed. Never serves requests.
    Redundant = 5,
}

impl LifecycleState {
    /// Lowercase name, as used in logs.
    pub const fn as_str(self) -> &'static str {
        match self {
            LifecycleState::Parsed => "parsed",
            LifecycleState::Installing => "installing",
            LifecycleState::Installed => "installed",
            LifecycleState::Activating => "activating",
            LifecycleState::Activated => "activated",
            LifecycleState::Redundant => "redundant",
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => LifecycleState::Parsed,
            1 => LifecycleState::Installing,
            2 => LifecycleState::Installed,
            3 => LifecycleState::Activating,
            4 => LifecycleState::Activated,
            _ => LifecycleState::Redundant,
        }
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful install.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallReport {
    /// Number of assets committed to the static namespace.
    pub assets: usize,
    /// The new version takes over without waiting for old pages to close.
    pub skip_waiting: bool,
}

/// Result of a successful activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActivationReport {
    /// Namespaces deleted because they are not live.
    pub removed: Vec<NamespaceName>,
    /// Already open pages are now intercepted.
    pub claimed_clients: bool,
}

/// Drives install and activation.
pub struct Lifecycle<S, F> {
    config: Arc<WorkerConfig>,
    storage: Arc<S>,
    fetcher: Arc<F>,
    state: AtomicU8,
    controls_clients: AtomicBool,
}

impl<S, F> fmt::Debug for Lifecycle<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lifecycle")
            .field("state", &self.state())
            .field("controls_clients", &self.controls_clients())
            .finish_non_exhaustive()
    }
}

impl<S, F> Lifecycle<S, F> {
    /// Current state.
    pub fn state(&self) -> LifecycleState {
        LifecycleState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Returns `true` once activation has claimed the open pages.
    pub fn controls_clients(&self) -> bool {
        self.controls_clients.load(Ordering::Acquire)
    }
}

impl<S, F> Lifecycle<S, F>
where
    S: CacheStorage,
    F: Fetch,
{
    /// A lifecycle in [`LifecycleState::Parsed`].
    pub fn new(config: Arc<WorkerConfig>, storage: Arc<S>, fetcher: Arc<F>) -> Self {
        Self {
            config,
            storage,
            fetcher,
            state: AtomicU8::new(LifecycleState::Parsed as u8),
            controls_clients: AtomicBool::new(false),
        }
    }

    fn transition(&self, from: LifecycleState, to: LifecycleState) -> Result<(), WorkerError> {
        self.state
            .compare_exchange(from as u8, to as u8, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| debug!(%from, %to, "lifecycle transition"))
            .map_err(|current| WorkerError::InvalidTransition {
                from: LifecycleState::from_u8(current),
                to,
            })
    }

    fn set(&self, state: LifecycleState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Provisions every static asset into the static namespace.
    ///
    /// All assets are fetched concurrently and committed together only if
    /// every one of them answered with a 2xx status. On any failure nothing
    /// is committed, a namespace created by this install is removed again,
    /// and the worker becomes [`LifecycleState::Redundant`].
    #[instrument(skip_all, fields(namespace = %self.config.static_namespace()))]
    pub async fn install(&self) -> Result<InstallReport, WorkerError> {
        self.transition(LifecycleState::Parsed, LifecycleState::Installing)?;
        info!(assets = self.config.static_assets().len(), "installing");

        match self.provision().await {
            Ok(assets) => {
                self.set(LifecycleState::Installed);
                info!(assets, "static assets provisioned");
                Ok(InstallReport {
                    assets,
                    skip_waiting: true,
                })
            }
            Err(err) => {
                self.set(LifecycleState::Redundant);
                error!(error = %err, "install failed");
                Err(err)
            }
        }
    }

    async fn provision(&self) -> Result<usize, WorkerError> {
        let name = self.config.static_namespace();
        let existed = self.storage.has(name).await?;

        let result = self.populate(name).await;
        if result.is_err() && !existed {
            if let Err(error) = self.storage.delete_namespace(name).await {
                warn!(%error, "failed to discard partially created namespace");
            }
        }
        result
    }

    async fn populate(&self, name: &NamespaceName) -> Result<usize, WorkerError> {
        let entries = try_join_all(
            self.config
                .static_assets()
                .iter()
                .map(|asset| self.fetch_asset(asset)),
        )
        .await?;

        let count = entries.len();
        let namespace = self.storage.open(name).await?;
        namespace.put_all(entries).await?;
        Ok(count)
    }

    async fn fetch_asset(
        &self,
        asset: &RequestDescriptor,
    ) -> Result<(RequestDescriptor, ResponseSnapshot), WorkerError> {
        let request = InterceptedRequest::from(asset.clone());
        let response =
            self.fetcher
                .fetch(&request)
                .await
                .map_err(|err| WorkerError::InstallFailed {
                    asset: asset.clone(),
                    cause: InstallCause::Fetch(err),
                })?;
        if !response.is_success() {
            return Err(WorkerError::InstallFailed {
                asset: asset.clone(),
                cause: InstallCause::Status(response.status()),
            });
        }
        debug!(%asset, "asset fetched");
        Ok((asset.clone(), response))
    }

    /// Deletes every namespace that is not live and claims the open pages.
    ///
    /// If a deletion fails the worker stays [`LifecycleState::Installed`] and
    /// activation can be retried.
    #[instrument(skip_all)]
    pub async fn activate(&self) -> Result<ActivationReport, WorkerError> {
        self.transition(LifecycleState::Installed, LifecycleState::Activating)?;
        info!("activating");

        match self.remove_superseded().await {
            Ok(removed) => {
                metrics::record_namespaces_removed(removed.len());
                self.controls_clients.store(true, Ordering::Release);
                self.set(LifecycleState::Activated);
                info!(removed = removed.len(), "activated, controlling open pages");
                Ok(ActivationReport {
                    removed,
                    claimed_clients: true,
                })
            }
            Err(err) => {
                self.set(LifecycleState::Installed);
                error!(error = %err, "activation failed");
                Err(err)
            }
        }
    }

    async fn remove_superseded(&self) -> Result<Vec<NamespaceName>, WorkerError> {
        let mut removed = Vec::new();
        for name in self.storage.names().await? {
            if self.config.is_live(&name) {
                continue;
            }
            let legacy = self.config.legacy_namespace() == Some(&name);
            info!(namespace = %name, legacy, "removing superseded namespace");
            if self.storage.delete_namespace(&name).await? {
                removed.push(name);
            }
        }
        Ok(removed)
    }
}
