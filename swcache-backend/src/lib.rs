//! Traits and types for swcache storage interaction.
//!
//! A [`CacheStorage`] is a registry of named, independent [`Namespace`]s.
//! Each namespace maps [`RequestDescriptor`]s to [`ResponseSnapshot`]s.
//! If you want to keep snapshots somewhere other than memory, implement
//! these two traits.
//!
//! [`RequestDescriptor`]: swcache_core::RequestDescriptor
//! [`ResponseSnapshot`]: swcache_core::ResponseSnapshot
mod error;
mod storage;

pub use error::StorageError;
pub use storage::{CacheStorage, Namespace, StorageResult};

/// Status of a delete operation.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum DeleteStatus {
    /// Record successfully deleted.
    Deleted(u32),
    /// Record already missing.
    Missing,
}

impl DeleteStatus {
    /// Returns `true` if something was removed.
    pub fn is_deleted(&self) -> bool {
        matches!(self, DeleteStatus::Deleted(_))
    }
}
