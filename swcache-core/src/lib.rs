#![warn(missing_docs)]
//! # swcache-core
//!
//! Core types for the swcache offline caching proxy.
//!
//! This crate holds the vocabulary shared by every other swcache crate:
//!
//! - [`RequestDescriptor`] - the lookup key of a cached entry (method + canonical URL)
//! - [`InterceptedRequest`] - a request issued by the page, with its [`Destination`]
//! - [`ResponseSnapshot`] - an immutable captured copy of one response
//! - [`NamespaceName`] - the version-stamped name of a cache namespace
//! - [`Fetch`] - the live network boundary
//! - [`Offload`] - spawning detached background refreshes
//!
//! Storage contracts live in `swcache-backend`, strategies and routing in `swcache`.

pub mod descriptor;
pub mod error;
pub mod fetch;
pub mod namespace;
pub mod offload;
pub mod request;
pub mod snapshot;

pub use descriptor::RequestDescriptor;
pub use error::FetchError;
pub use fetch::Fetch;
pub use namespace::NamespaceName;
pub use offload::Offload;
pub use request::{Destination, InterceptedRequest, RequestMode};
pub use snapshot::ResponseSnapshot;
#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw body bytes of a snapshot.
/// `Bytes` keeps snapshot clones cheap: cloning only bumps a reference count.
pub type Raw = bytes::Bytes;
