//! Namespace name type for identifying cache buckets.
//!
//! `NamespaceName` is a newtype wrapper around `SmolStr`. Names are
//! version-stamped literals such as `static-v1.0`; bumping the version in
//! configuration makes the previous namespace garbage at the next activation.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use std::fmt;

/// The name of a cache namespace.
///
/// # Example
/// ```
/// use swcache_core::NamespaceName;
///
/// let name = NamespaceName::new_static("static-v1.0");
/// assert_eq!(name.as_str(), "static-v1.0");
/// assert_eq!(name, NamespaceName::from("static-v1.0"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceName(SmolStr);

impl NamespaceName {
    /// Creates a new namespace name.
    #[inline]
    pub fn new(s: impl Into<SmolStr>) -> Self {
        Self(s.into())
    }

    /// Creates a namespace name from a static string (no allocation).
    #[inline]
    pub const fn new_static(s: &'static str) -> Self {
        Self(SmolStr::new_static(s))
    }

    /// Returns the name as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` if the name is empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for NamespaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<&str> for NamespaceName {
    #[inline]
    fn from(s: &str) -> Self {
        Self(SmolStr::new(s))
    }
}

impl From<String> for NamespaceName {
    #[inline]
    fn from(s: String) -> Self {
        Self(SmolStr::from(s))
    }
}

impl AsRef<str> for NamespaceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}
