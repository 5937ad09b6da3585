use std::time::Duration;

use swcache_core::NamespaceName;

use super::{ConfigError, ConfigFile, WorkerConfig};
use crate::notification::NotificationConfig;

/// Builder for [`WorkerConfig`].
///
/// Starts from the default deployment; every setter overrides one field.
/// Validation happens in [`build`](Self::build).
///
/// ```
/// use std::time::Duration;
/// use swcache::WorkerConfig;
///
/// let config = WorkerConfig::builder()
///     .origin("https://cedodev.com/")
///     .static_namespace("static-v1.1")
///     .dynamic_namespace("dynamic-v1.1")
///     .fetch_timeout(Duration::from_secs(10))
///     .build()
///     .unwrap();
/// assert_eq!(config.static_namespace().as_str(), "static-v1.1");
/// ```
#[derive(Debug, Clone, Default)]
pub struct WorkerConfigBuilder {
    file: ConfigFile,
}

impl WorkerConfigBuilder {
    /// Creates a builder holding the default deployment.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the origin site paths resolve against.
    pub fn origin(mut self, origin: impl Into<String>) -> Self {
        self.file.origin = origin.into();
        self
    }

    /// Sets the static namespace name.
    pub fn static_namespace(mut self, name: impl Into<NamespaceName>) -> Self {
        self.file.static_namespace = name.into();
        self
    }

    /// Sets the dynamic namespace name.
    pub fn dynamic_namespace(mut self, name: impl Into<NamespaceName>) -> Self {
        self.file.dynamic_namespace = name.into();
        self
    }

    /// Sets or clears the legacy namespace name.
    pub fn legacy_namespace(mut self, name: Option<NamespaceName>) -> Self {
        self.file.legacy_namespace = name;
        self
    }

    /// Replaces the static asset list.
    pub fn static_assets<I, S>(mut self, assets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file.static_assets = assets.into_iter().map(Into::into).collect();
        self
    }

    /// Replaces the network-first patterns.
    pub fn network_first<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.file.network_first = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the offline fallback document.
    pub fn offline_fallback(mut self, path: impl Into<String>) -> Self {
        self.file.offline_fallback = path.into();
        self
    }

    /// Sets the background sync tag and endpoint.
    pub fn sync(mut self, tag: impl Into<String>, endpoint: impl Into<String>) -> Self {
        self.file.sync.tag = tag.into();
        self.file.sync.endpoint = endpoint.into();
        self
    }

    /// Sets the expiry age.
    pub fn max_age(mut self, max_age: Duration) -> Self {
        self.file.expiry.max_age = max_age;
        self
    }

    /// Bounds every network fetch.
    pub fn fetch_timeout(mut self, timeout: Duration) -> Self {
        self.file.fetch_timeout = Some(timeout);
        self
    }

    /// Sets the push notification content.
    pub fn notification(mut self, notification: NotificationConfig) -> Self {
        self.file.notification = notification;
        self
    }

    /// Validates and builds the configuration.
    pub fn build(self) -> Result<WorkerConfig, ConfigError> {
        self.file.into_config()
    }
}

impl From<ConfigFile> for WorkerConfigBuilder {
    fn from(file: ConfigFile) -> Self {
        Self { file }
    }
}
