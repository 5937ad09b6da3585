//! Serializable configuration, as written in YAML.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use swcache_core::NamespaceName;

use crate::notification::NotificationConfig;

/// Configuration as it appears in a file.
///
/// Every field has a default reproducing the portfolio deployment, so a file
/// only needs the fields it changes:
///
/// ```yaml
/// origin: https://cedodev.com/
/// static_namespace: static-v1.1
/// expiry:
///   max_age: 3d
/// fetch_timeout: 15s
/// ```
///
/// Convert with [`ConfigFile::into_config`], which resolves and validates it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ConfigFile {
    /// Base URL that site-relative paths are resolved against.
    pub origin: String,
    /// Live namespace holding pre-provisioned and cache-first assets.
    pub static_namespace: NamespaceName,
    /// Live namespace holding network-first and stale-while-revalidate entries.
    pub dynamic_namespace: NamespaceName,
    /// Name used by the pre-split deployment. Never live; removed at activation.
    pub legacy_namespace: Option<NamespaceName>,
    /// Assets provisioned into the static namespace at install, in order.
    pub static_assets: Vec<String>,
    /// URL fragments whose requests always go network-first.
    pub network_first: Vec<String>,
    /// Page served to offline navigations that miss every namespace.
    pub offline_fallback: String,
    /// Background sync settings.
    pub sync: SyncFile,
    /// Expiry sweep settings.
    pub expiry: ExpiryFile,
    /// Upper bound for a single network fetch. Unbounded when absent.
    #[serde(with = "humantime_serde")]
    pub fetch_timeout: Option<Duration>,
    /// Fixed content of push notifications.
    pub notification: NotificationConfig,
}

/// Background sync section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SyncFile {
    /// Tag that triggers the refresh. Other tags are ignored.
    pub tag: String,
    /// Endpoint whose snapshot is refreshed in the dynamic namespace.
    pub endpoint: String,
}

/// Expiry sweep section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ExpiryFile {
    /// Entries older than this are removed by the sweep.
    #[serde(with = "humantime_serde")]
    pub max_age: Duration,
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            origin: "http://localhost/".to_owned(),
            static_namespace: NamespaceName::new_static("static-v1.0"),
            dynamic_namespace: NamespaceName::new_static("dynamic-v1.0"),
            legacy_namespace: Some(NamespaceName::new_static("cedodev-portfolio-v1.0")),
            static_assets: vec![
                "/".to_owned(),
                "/index.html".to_owned(),
                "/styles.css".to_owned(),
                "/script.js".to_owned(),
                "/favicon.svg".to_owned(),
                "https://cdn.jsdelivr.net/npm/boxicons@2.1.4/css/boxicons.min.css".to_owned(),
                concat!(
                    "https://fonts.googleapis.com/css2",
                    "?family=Inter:wght@300;400;500;600;700&display=swap"
                )
                .to_owned(),
            ],
            network_first: vec![
                "https://api.github.com/".to_owned(),
                "https://formspree.io/".to_owned(),
            ],
            offline_fallback: "/index.html".to_owned(),
            sync: SyncFile::default(),
            expiry: ExpiryFile::default(),
            fetch_timeout: None,
            notification: NotificationConfig::default(),
        }
    }
}

impl Default for SyncFile {
    fn default() -> Self {
        Self {
            tag: "portfolio-sync".to_owned(),
            endpoint: "https://api.github.com/users/ogkauann/repos".to_owned(),
        }
    }
}

impl Default for ExpiryFile {
    fn default() -> Self {
        Self {
            max_age: Duration::from_secs(7 * 24 * 60 * 60),
        }
    }
}
