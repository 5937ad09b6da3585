//! Worker configuration.
//!
//! [`WorkerConfig`] is the resolved, immutable form every component reads
//! from. It is produced either from YAML ([`WorkerConfig::from_yaml`]), from
//! a [`ConfigFile`] value, or through [`WorkerConfig::builder`]. All three
//! paths run the same validation, so a `WorkerConfig` always holds parsed
//! URLs and distinct, non-empty namespace names.

mod builder;
mod file;

use std::time::Duration;

use smol_str::SmolStr;
use swcache_core::{NamespaceName, RequestDescriptor};
use thiserror::Error;
use url::Url;

use crate::notification::NotificationConfig;

pub use builder::WorkerConfigBuilder;
pub use file::{ConfigFile, ExpiryFile, SyncFile};

/// Error raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The YAML document could not be parsed.
    #[error("invalid configuration document: {0}")]
    Parse(String),

    /// A URL or site path could not be resolved.
    #[error("invalid URL in `{field}`: {value:?} ({reason})")]
    InvalidUrl {
        /// Configuration field holding the value.
        field: &'static str,
        /// The offending value.
        value: String,
        /// Parser message.
        reason: String,
    },

    /// A namespace name is empty.
    #[error("namespace name in `{0}` must not be empty")]
    EmptyNamespace(&'static str),

    /// Two namespace fields share a name.
    #[error("namespace {0} is configured more than once")]
    DuplicateNamespace(NamespaceName),

    /// The expiry age is zero or too large to compare against dates.
    #[error("expiry max_age {0:?} is out of range")]
    InvalidMaxAge(Duration),
}

/// Resolved worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    origin: Url,
    static_namespace: NamespaceName,
    dynamic_namespace: NamespaceName,
    legacy_namespace: Option<NamespaceName>,
    static_assets: Vec<RequestDescriptor>,
    network_first: Vec<SmolStr>,
    offline_fallback: RequestDescriptor,
    sync_tag: SmolStr,
    sync_endpoint: RequestDescriptor,
    max_age: Duration,
    fetch_timeout: Option<Duration>,
    notification: NotificationConfig,
}

// Ten years. Anything beyond is treated as a configuration mistake.
const MAX_AGE_LIMIT: Duration = Duration::from_secs(10 * 365 * 24 * 60 * 60);

impl WorkerConfig {
    /// Returns a builder seeded with the default deployment.
    pub fn builder() -> WorkerConfigBuilder {
        WorkerConfigBuilder::new()
    }

    /// Parses and validates a YAML document.
    ///
    /// Missing fields take their default values.
    pub fn from_yaml(document: &str) -> Result<Self, ConfigError> {
        let file: ConfigFile =
            serde_saphyr::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))?;
        file.into_config()
    }

    /// Base URL site paths are resolved against.
    pub fn origin(&self) -> &Url {
        &self.origin
    }

    /// Live namespace for provisioned and cache-first assets.
    pub fn static_namespace(&self) -> &NamespaceName {
        &self.static_namespace
    }

    /// Live namespace for network-first and stale-while-revalidate entries.
    pub fn dynamic_namespace(&self) -> &NamespaceName {
        &self.dynamic_namespace
    }

    /// Name of the pre-split namespace, if one is configured.
    pub fn legacy_namespace(&self) -> Option<&NamespaceName> {
        self.legacy_namespace.as_ref()
    }

    /// The namespaces that survive activation.
    pub fn live_namespaces(&self) -> [&NamespaceName; 2] {
        [&self.static_namespace, &self.dynamic_namespace]
    }

    /// Returns `true` if `name` is one of the live namespaces.
    pub fn is_live(&self, name: &NamespaceName) -> bool {
        self.live_namespaces().contains(&name)
    }

    /// Assets provisioned at install, in configured order.
    pub fn static_assets(&self) -> &[RequestDescriptor] {
        &self.static_assets
    }

    /// URL fragments routed network-first.
    pub fn network_first_patterns(&self) -> &[SmolStr] {
        &self.network_first
    }

    /// Returns `true` if `url` contains any network-first pattern.
    pub fn is_network_first(&self, url: &Url) -> bool {
        let url = url.as_str();
        self.network_first
            .iter()
            .any(|pattern| url.contains(pattern.as_str()))
    }

    /// Root document served to offline navigations.
    pub fn offline_fallback(&self) -> &RequestDescriptor {
        &self.offline_fallback
    }

    /// Tag accepted by background sync.
    pub fn sync_tag(&self) -> &str {
        &self.sync_tag
    }

    /// Endpoint refreshed by background sync.
    pub fn sync_endpoint(&self) -> &RequestDescriptor {
        &self.sync_endpoint
    }

    /// Age past which the sweep removes an entry.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Upper bound for one network fetch, if any.
    pub fn fetch_timeout(&self) -> Option<Duration> {
        self.fetch_timeout
    }

    /// Push notification content.
    pub fn notification(&self) -> &NotificationConfig {
        &self.notification
    }
}

impl ConfigFile {
    /// Resolves every path and checks the namespace layout.
    pub fn into_config(self) -> Result<WorkerConfig, ConfigError> {
        let origin = Url::parse(&self.origin).map_err(|err| ConfigError::InvalidUrl {
            field: "origin",
            value: self.origin.clone(),
            reason: err.to_string(),
        })?;

        check_namespaces(
            &self.static_namespace,
            &self.dynamic_namespace,
            self.legacy_namespace.as_ref(),
        )?;

        if self.expiry.max_age.is_zero() || self.expiry.max_age > MAX_AGE_LIMIT {
            return Err(ConfigError::InvalidMaxAge(self.expiry.max_age));
        }

        let static_assets = self
            .static_assets
            .iter()
            .map(|path| resolve(&origin, "static_assets", path))
            .collect::<Result<Vec<_>, _>>()?;
        let offline_fallback = resolve(&origin, "offline_fallback", &self.offline_fallback)?;
        let sync_endpoint = resolve(&origin, "sync.endpoint", &self.sync.endpoint)?;

        Ok(WorkerConfig {
            origin,
            static_namespace: self.static_namespace,
            dynamic_namespace: self.dynamic_namespace,
            legacy_namespace: self.legacy_namespace,
            static_assets,
            network_first: self.network_first.into_iter().map(SmolStr::from).collect(),
            offline_fallback,
            sync_tag: SmolStr::from(self.sync.tag),
            sync_endpoint,
            max_age: self.expiry.max_age,
            fetch_timeout: self.fetch_timeout,
            notification: self.notification,
        })
    }
}

fn resolve(
    origin: &Url,
    field: &'static str,
    path: &str,
) -> Result<RequestDescriptor, ConfigError> {
    RequestDescriptor::resolve(origin, path).map_err(|err| ConfigError::InvalidUrl {
        field,
        value: path.to_owned(),
        reason: err.to_string(),
    })
}

fn check_namespaces(
    static_namespace: &NamespaceName,
    dynamic_namespace: &NamespaceName,
    legacy_namespace: Option<&NamespaceName>,
) -> Result<(), ConfigError> {
    if static_namespace.is_empty() {
        return Err(ConfigError::EmptyNamespace("static_namespace"));
    }
    if dynamic_namespace.is_empty() {
        return Err(ConfigError::EmptyNamespace("dynamic_namespace"));
    }
    if static_namespace == dynamic_namespace {
        return Err(ConfigError::DuplicateNamespace(static_namespace.clone()));
    }
    if let Some(legacy) = legacy_namespace {
        if legacy.is_empty() {
            return Err(ConfigError::EmptyNamespace("legacy_namespace"));
        }
        if legacy == static_namespace || legacy == dynamic_namespace {
            return Err(ConfigError::DuplicateNamespace(legacy.clone()));
        }
    }
    Ok(())
}
