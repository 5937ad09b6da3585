//! Result types of fetch interception.

use swcache_core::{NamespaceName, ResponseSnapshot};

/// Where a response came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseSource {
    /// Fresh from the network.
    Network,
    /// Stored entry for the request itself, found in the given namespace.
    Cache(NamespaceName),
    /// The offline fallback document, served in place of a failed navigation.
    Fallback(NamespaceName),
}

impl ResponseSource {
    /// Returns the source as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Cache(name) | ResponseSource::Fallback(name) => name.as_str(),
        }
    }

    /// Returns `true` unless the response came from the network.
    #[inline]
    pub fn is_cached(&self) -> bool {
        !matches!(self, ResponseSource::Network)
    }
}

/// A response together with its source.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The response handed to the page.
    pub response: ResponseSnapshot,
    /// Where it came from.
    pub source: ResponseSource,
}

impl Outcome {
    /// A live network response.
    pub fn network(response: ResponseSnapshot) -> Self {
        Outcome {
            response,
            source: ResponseSource::Network,
        }
    }

    /// A stored entry for the request, found in `namespace`.
    pub fn cached(namespace: NamespaceName, response: ResponseSnapshot) -> Self {
        Outcome {
            response,
            source: ResponseSource::Cache(namespace),
        }
    }

    /// The offline fallback document, found in `namespace`.
    pub fn fallback(namespace: NamespaceName, response: ResponseSnapshot) -> Self {
        Outcome {
            response,
            source: ResponseSource::Fallback(namespace),
        }
    }
}

/// What the worker does with an intercepted request.
#[derive(Debug, Clone, PartialEq)]
pub enum Interception {
    /// Answer with this response.
    Respond(Outcome),
    /// Do not intercept: the request goes to the network untouched.
    Passthrough,
}

impl Interception {
    /// Returns the outcome when the request was answered.
    pub fn outcome(&self) -> Option<&Outcome> {
        match self {
            Interception::Respond(outcome) => Some(outcome),
            Interception::Passthrough => None,
        }
    }

    /// Consumes the interception, returning the outcome if there is one.
    pub fn into_outcome(self) -> Option<Outcome> {
        match self {
            Interception::Respond(outcome) => Some(outcome),
            Interception::Passthrough => None,
        }
    }
}
