//! Builder for configuring [`MokaStorage`].

use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use swcache_core::{RequestDescriptor, ResponseSnapshot};

use crate::storage::MokaStorage;

/// Marker type: capacity has not been configured yet.
///
/// You must call either [`max_entries()`](MokaStorageBuilder::max_entries) or
/// [`max_bytes()`](MokaStorageBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: each namespace holds at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: each namespace uses at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

#[derive(Debug, Clone, Copy)]
enum Capacity {
    Entries(u64),
    Bytes(u64),
}

/// Creates one Moka cache per namespace with the configured limits.
#[derive(Clone)]
pub(crate) struct CacheFactory {
    capacity: Capacity,
    eviction_policy: Option<EvictionPolicy>,
}

impl std::fmt::Debug for CacheFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CacheFactory")
            .field("capacity", &self.capacity)
            .field("custom_eviction_policy", &self.eviction_policy.is_some())
            .finish()
    }
}

impl CacheFactory {
    pub(crate) fn build(&self) -> Cache<RequestDescriptor, ResponseSnapshot> {
        match self.capacity {
            Capacity::Entries(entries) => {
                let policy = self
                    .eviction_policy
                    .clone()
                    .unwrap_or_else(EvictionPolicy::tiny_lfu);
                CacheBuilder::new(entries).eviction_policy(policy).build()
            }
            Capacity::Bytes(bytes) => {
                let policy = self
                    .eviction_policy
                    .clone()
                    .unwrap_or_else(EvictionPolicy::lru);
                CacheBuilder::new(bytes)
                    .weigher(byte_weigher)
                    .eviction_policy(policy)
                    .build()
            }
        }
    }
}

/// Approximate byte cost of one entry.
fn byte_weigher(descriptor: &RequestDescriptor, snapshot: &ResponseSnapshot) -> u32 {
    (descriptor.memory_size() + snapshot.memory_size()).min(u32::MAX as usize) as u32
}

/// Builder for creating and configuring a [`MokaStorage`].
///
/// Use [`MokaStorage::builder`] to create a new builder instance.
///
/// # Capacity Configuration (Required)
///
/// Capacity applies to every namespace separately. Configure exactly one of:
/// - [`max_entries(n)`](Self::max_entries) - limit by entry count
/// - [`max_bytes(n)`](Self::max_bytes) - limit by approximate memory usage
///
/// `build()` only exists once capacity is set.
///
/// # Examples
///
/// ```
/// use swcache_moka::{EvictionPolicy, MokaStorage};
///
/// let storage = MokaStorage::builder()
///     .max_bytes(64 * 1024 * 1024)
///     .eviction_policy(EvictionPolicy::lru())
///     .build();
/// ```
pub struct MokaStorageBuilder<Cap> {
    capacity: Cap,
    eviction_policy: Option<EvictionPolicy>,
}

impl MokaStorageBuilder<NoCapacity> {
    /// Creates a new builder with no capacity configured.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            eviction_policy: None,
        }
    }

    /// Sets the maximum number of entries each namespace can hold.
    pub fn max_entries(self, capacity: u64) -> MokaStorageBuilder<EntryCapacity> {
        MokaStorageBuilder {
            capacity: EntryCapacity(capacity),
            eviction_policy: self.eviction_policy,
        }
    }

    /// Sets the memory budget of each namespace in bytes.
    ///
    /// The byte count covers the URL, headers and body of each snapshot plus
    /// a fixed per-entry overhead.
    pub fn max_bytes(self, bytes: u64) -> MokaStorageBuilder<ByteCapacity> {
        MokaStorageBuilder {
            capacity: ByteCapacity(bytes),
            eviction_policy: self.eviction_policy,
        }
    }
}

impl Default for MokaStorageBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStorageBuilder<Cap> {
    /// Sets the eviction policy used when a namespace reaches capacity.
    ///
    /// # Default
    ///
    /// - entry capacity: [`EvictionPolicy::tiny_lfu()`]
    /// - byte capacity: [`EvictionPolicy::lru()`], since TinyLFU admission can
    ///   reject a new weighted entry even when eviction could make room
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }
}

impl MokaStorageBuilder<EntryCapacity> {
    /// Builds the [`MokaStorage`] with entry-count based capacity.
    pub fn build(self) -> MokaStorage {
        MokaStorage::from_factory(CacheFactory {
            capacity: Capacity::Entries(self.capacity.0),
            eviction_policy: self.eviction_policy,
        })
    }
}

impl MokaStorageBuilder<ByteCapacity> {
    /// Builds the [`MokaStorage`] with byte-based capacity.
    pub fn build(self) -> MokaStorage {
        MokaStorage::from_factory(CacheFactory {
            capacity: Capacity::Bytes(self.capacity.0),
            eviction_policy: self.eviction_policy,
        })
    }
}
