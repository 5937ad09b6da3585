//! Requests issued by the page and intercepted by the proxy.

use http::{HeaderMap, Method};
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

use crate::descriptor::RequestDescriptor;
use crate::error::FetchError;

/// The kind of resource a request is loading.
///
/// Mirrors the fetch `destination` of the original request; the router uses
/// it to pick a caching strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    /// A top-level navigation (HTML page).
    Document,
    /// A nested navigation inside an `<iframe>`.
    Iframe,
    /// A stylesheet.
    Style,
    /// A script.
    Script,
    /// An image.
    Image,
    /// A web font.
    Font,
    /// A manifest file.
    Manifest,
    /// Anything without a destination, e.g. `fetch()` calls from scripts.
    #[default]
    Empty,
}

impl Destination {
    /// Returns `true` for the static subresource kinds: style, script, image and font.
    pub fn is_static_subresource(self) -> bool {
        matches!(self, Self::Style | Self::Script | Self::Image | Self::Font)
    }

    /// Returns the lowercase name used by the fetch standard.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Iframe => "iframe",
            Self::Style => "style",
            Self::Script => "script",
            Self::Image => "image",
            Self::Font => "font",
            Self::Manifest => "manifest",
            Self::Empty => "",
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request mode as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RequestMode {
    /// A navigation request.
    Navigate,
    /// A same-origin request.
    SameOrigin,
    /// A cross-origin request without CORS.
    NoCors,
    /// A CORS request.
    #[default]
    Cors,
}

/// A request issued by the page.
#[derive(Debug, Clone)]
pub struct InterceptedRequest {
    descriptor: RequestDescriptor,
    destination: Destination,
    mode: RequestMode,
    headers: HeaderMap,
}

impl InterceptedRequest {
    /// Creates a request for the given descriptor with no headers.
    pub fn new(descriptor: RequestDescriptor, destination: Destination) -> Self {
        let mode = match destination {
            Destination::Document | Destination::Iframe => RequestMode::Navigate,
            _ => RequestMode::default(),
        };
        InterceptedRequest {
            descriptor,
            destination,
            mode,
            headers: HeaderMap::new(),
        }
    }

    /// Parses an absolute URL and creates a `GET` request with the given destination.
    pub fn get(url: &str, destination: Destination) -> Result<Self, FetchError> {
        Ok(Self::new(RequestDescriptor::get(url)?, destination))
    }

    /// Overrides the request mode.
    pub fn with_mode(mut self, mode: RequestMode) -> Self {
        self.mode = mode;
        self
    }

    /// Replaces the request headers.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Returns the lookup key of this request.
    #[inline]
    pub fn descriptor(&self) -> &RequestDescriptor {
        &self.descriptor
    }

    /// Returns the resource kind.
    #[inline]
    pub fn destination(&self) -> Destination {
        self.destination
    }

    /// Returns the request mode.
    #[inline]
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// Returns the request headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        self.descriptor.method()
    }

    /// Returns the request URL.
    #[inline]
    pub fn url(&self) -> &Url {
        self.descriptor.url()
    }

    /// Returns `true` if the request loads a page: a document destination or
    /// any request in navigate mode.
    pub fn is_navigation(&self) -> bool {
        self.destination == Destination::Document || self.mode == RequestMode::Navigate
    }
}

impl From<RequestDescriptor> for InterceptedRequest {
    fn from(descriptor: RequestDescriptor) -> Self {
        InterceptedRequest::new(descriptor, Destination::Empty)
    }
}
