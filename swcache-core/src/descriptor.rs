//! Request descriptors: the lookup key of a cached entry.
//!
//! Two descriptors are equal iff their method and canonical URL match.
//! Headers never take part in the key, so a `Vary`-style split of entries
//! is not possible.
//!
//! ## Canonical form
//!
//! The URL is parsed by [`url::Url`], which already normalizes scheme and
//! host case, default ports and percent-encoding. On top of that the
//! fragment is dropped, since it never reaches the network.
//!
//! ```
//! use swcache_core::RequestDescriptor;
//!
//! let a = RequestDescriptor::get("HTTPS://Example.com:443/index.html#top").unwrap();
//! let b = RequestDescriptor::get("https://example.com/index.html").unwrap();
//! assert_eq!(a, b);
//! assert_eq!(format!("{}", a), "GET https://example.com/index.html");
//! ```
//!
//! ## Performance
//!
//! [`RequestDescriptor`] uses `Arc` internally: keys are cloned into storage
//! and into background refresh tasks, and cloning only bumps a reference count.

use http::Method;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::size_of;
use std::sync::Arc;
use url::Url;

use crate::error::FetchError;

#[derive(Debug, Clone, Eq, PartialEq, Hash)]
struct DescriptorInner {
    method: Method,
    url: Url,
}

/// The key under which a snapshot is stored in a namespace.
#[derive(Clone, Debug)]
pub struct RequestDescriptor {
    inner: Arc<DescriptorInner>,
}

impl PartialEq for RequestDescriptor {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for RequestDescriptor {}

impl Hash for RequestDescriptor {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl RequestDescriptor {
    /// Creates a descriptor from a method and an already parsed URL.
    pub fn new(method: Method, mut url: Url) -> Self {
        url.set_fragment(None);
        RequestDescriptor {
            inner: Arc::new(DescriptorInner { method, url }),
        }
    }

    /// Parses an absolute URL and creates a `GET` descriptor for it.
    pub fn get(url: &str) -> Result<Self, FetchError> {
        let url = Url::parse(url).map_err(|err| FetchError::InvalidRequest(err.to_string()))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Resolves `path` against `base` and creates a `GET` descriptor.
    ///
    /// Absolute URLs in `path` replace the base entirely, which is how the
    /// static asset list mixes site paths with CDN stylesheets.
    pub fn resolve(base: &Url, path: &str) -> Result<Self, FetchError> {
        let url = base
            .join(path)
            .map_err(|err| FetchError::InvalidRequest(format!("{path}: {err}")))?;
        Ok(Self::new(Method::GET, url))
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the canonical URL.
    #[inline]
    pub fn url(&self) -> &Url {
        &self.inner.url
    }

    /// Returns `true` for `http` and `https` URLs.
    pub fn is_http(&self) -> bool {
        matches!(self.inner.url.scheme(), "http" | "https")
    }

    /// Returns the estimated memory usage of this descriptor in bytes.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + size_of::<DescriptorInner>() + self.inner.url.as_str().len()
    }
}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}
