//! Persistent key/value storage shared by every client-side feature.
//!
//! This is the process-level counterpart of a browser's local storage
//! area: a flat namespace of string keys to string values. The cache
//! manager, bookmarks, settings and admin session all live in the same
//! area and are kept apart by key prefixes.
//!
//! Backends:
//! - `FileStorage`: one file per key, persisted across runs
//! - `MemoryStorage`: in-process map, used for tests and as a fallback
//! - `DisabledStorage`: every operation fails, as when storage is switched off

pub mod file;
pub mod memory;

use thiserror::Error;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Assumed storage ceiling, in characters (5 MiB).
pub const DEFAULT_QUOTA_CHARS: usize = 5 * 1024 * 1024;

/// Key written and removed by the availability probe.
const PROBE_KEY: &str = "__storage_test__";

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage quota exceeded: {requested} chars requested, {available} available")]
    QuotaExceeded { requested: usize, available: usize },

    #[error("Storage is unavailable")]
    Unavailable,

    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl StorageError {
    pub fn is_quota_exceeded(&self) -> bool {
        matches!(self, StorageError::QuotaExceeded { .. })
    }
}

/// A flat string key/value store.
///
/// Each key is written as one unit: a failed `set_item` leaves the previous
/// value (or absence) in place.
pub trait KeyValueStorage: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;

    fn remove_item(&self, key: &str) -> Result<(), StorageError>;

    /// All keys currently stored, in no particular order.
    fn keys(&self) -> Result<Vec<String>, StorageError>;

    /// Probe whether the storage accepts writes.
    fn is_available(&self) -> bool {
        self.set_item(PROBE_KEY, "test").is_ok() && self.remove_item(PROBE_KEY).is_ok()
    }
}

/// Storage that refuses every operation.
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledStorage;

impl KeyValueStorage for DisabledStorage {
    fn get_item(&self, _key: &str) -> Result<Option<String>, StorageError> {
        Err(StorageError::Unavailable)
    }

    fn set_item(&self, _key: &str, _value: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn remove_item(&self, _key: &str) -> Result<(), StorageError> {
        Err(StorageError::Unavailable)
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Err(StorageError::Unavailable)
    }
}

/// Character footprint of one key/value pair, the unit quotas are counted in.
pub fn entry_chars(key: &str, value: &str) -> usize {
    key.chars().count() + value.chars().count()
}
