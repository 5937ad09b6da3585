//! Maintenance jobs: background sync and the expiry sweep.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use http::StatusCode;
use swcache_backend::{CacheStorage, Namespace};
use swcache_core::{Fetch, InterceptedRequest, RequestDescriptor};
use tracing::{debug, error, info, instrument};

use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::metrics;

/// Result of a background sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The tag is not the configured one; nothing was done.
    Ignored,
    /// The endpoint snapshot in the dynamic namespace was replaced.
    Refreshed,
    /// The endpoint answered with a non-2xx status; the old snapshot stays.
    Rejected(StatusCode),
    /// The refresh failed. The error has been logged.
    Failed,
}

/// Result of an expiry sweep.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SweepReport {
    /// Entries removed for being older than the maximum age.
    pub removed: Vec<RequestDescriptor>,
    /// Dated entries young enough to stay.
    pub retained: usize,
    /// Entries kept because their age cannot be told.
    pub undated: usize,
}

impl fmt::Display for SweepReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} removed, {} retained, {} undated",
            self.removed.len(),
            self.retained,
            self.undated
        )
    }
}

/// Runs the maintenance jobs against the dynamic namespace.
pub struct Maintenance<S, F> {
    config: Arc<WorkerConfig>,
    storage: Arc<S>,
    fetcher: Arc<F>,
}

impl<S, F> fmt::Debug for Maintenance<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Maintenance")
            .field("namespace", self.config.dynamic_namespace())
            .field("max_age", &self.config.max_age())
            .finish_non_exhaustive()
    }
}

impl<S, F> Maintenance<S, F>
where
    S: CacheStorage,
    F: Fetch,
{
    /// Jobs over `storage`, refreshing through `fetcher`.
    pub fn new(config: Arc<WorkerConfig>, storage: Arc<S>, fetcher: Arc<F>) -> Self {
        Self {
            config,
            storage,
            fetcher,
        }
    }

    /// Refreshes the sync endpoint when `tag` is the configured sync tag.
    ///
    /// Never fails: errors are logged and reported as [`SyncOutcome::Failed`].
    #[instrument(skip(self))]
    pub async fn background_sync(&self, tag: &str) -> SyncOutcome {
        if tag != self.config.sync_tag() {
            debug!("unknown sync tag");
            return SyncOutcome::Ignored;
        }
        match self.refresh_endpoint().await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(error = %err, "background sync failed");
                SyncOutcome::Failed
            }
        }
    }

    async fn refresh_endpoint(&self) -> Result<SyncOutcome, WorkerError> {
        let endpoint = self.config.sync_endpoint();
        let response = self
            .fetcher
            .fetch(&InterceptedRequest::from(endpoint.clone()))
            .await?;

        if !response.is_success() {
            info!(status = %response.status(), %endpoint, "sync endpoint rejected the refresh");
            return Ok(SyncOutcome::Rejected(response.status()));
        }

        let namespace = self.storage.open(self.config.dynamic_namespace()).await?;
        namespace.put(endpoint, response).await?;
        info!(%endpoint, "sync endpoint refreshed");
        Ok(SyncOutcome::Refreshed)
    }

    /// Removes dynamic entries older than the configured maximum age.
    pub async fn sweep_expired(&self) -> Result<SweepReport, WorkerError> {
        self.sweep_expired_at(Utc::now()).await
    }

    /// Same as [`sweep_expired`](Self::sweep_expired), measuring ages at `now`.
    ///
    /// An entry is removed when its `date` header is strictly more than the
    /// maximum age before `now`. Entries without a parseable date, or dated
    /// in the future, are kept.
    #[instrument(skip(self), fields(namespace = %self.config.dynamic_namespace()))]
    pub async fn sweep_expired_at(&self, now: DateTime<Utc>) -> Result<SweepReport, WorkerError> {
        let name = self.config.dynamic_namespace();
        if !self.storage.has(name).await? {
            debug!("nothing to sweep");
            return Ok(SweepReport::default());
        }

        let namespace = self.storage.open(name).await?;
        let max_age = self.config.max_age();
        let mut report = SweepReport::default();

        for descriptor in namespace.keys().await? {
            // Removed concurrently since the listing.
            let Some(snapshot) = namespace.lookup(&descriptor).await? else {
                continue;
            };
            let Some(age) = snapshot.age(now) else {
                report.undated += 1;
                continue;
            };
            match age.to_std() {
                Ok(age) if age > max_age => {
                    namespace.delete(&descriptor).await?;
                    debug!(%descriptor, age_secs = age.as_secs(), "expired entry removed");
                    report.removed.push(descriptor);
                }
                _ => report.retained += 1,
            }
        }

        metrics::record_expired(report.removed.len());
        info!(%report, "expiry sweep finished");
        Ok(report)
    }
}
