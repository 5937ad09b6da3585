//! In-memory cache storage for swcache, powered by Moka.
//!
//! Each namespace is its own `moka::future::Cache`; the set of namespaces is
//! kept in a `DashMap`.
//!
//! ```
//! use swcache_moka::MokaStorage;
//!
//! let storage = MokaStorage::builder().max_entries(1_000).build();
//! ```
#![warn(missing_docs)]

mod builder;
mod storage;

pub use builder::{ByteCapacity, EntryCapacity, MokaStorageBuilder, NoCapacity};
pub use moka::policy::EvictionPolicy;
pub use storage::{MokaNamespace, MokaStorage};
