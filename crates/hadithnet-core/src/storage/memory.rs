//! In-process key/value storage.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use super::{entry_chars, KeyValueStorage, StorageError, DEFAULT_QUOTA_CHARS};

/// Map-backed storage with the same quota accounting as `FileStorage`.
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
    quota_chars: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::with_quota(DEFAULT_QUOTA_CHARS)
    }

    pub fn with_quota(quota_chars: usize) -> Self {
        Self {
            items: Mutex::new(HashMap::new()),
            quota_chars,
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, String>> {
        // A poisoned map is still structurally valid; keep serving it.
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Characters currently stored across all keys.
    pub fn used_chars(&self) -> usize {
        self.lock().iter().map(|(k, v)| entry_chars(k, v)).sum()
    }
}

impl Default for MemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.lock().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut items = self.lock();
        let used: usize = items
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| entry_chars(k, v))
            .sum();
        let requested = entry_chars(key, value);
        if used + requested > self.quota_chars {
            return Err(StorageError::QuotaExceeded {
                requested,
                available: self.quota_chars.saturating_sub(used),
            });
        }
        items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        self.lock().remove(key);
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.lock().keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let storage = MemoryStorage::new();
        storage.set_item("a", "1").unwrap();
        assert_eq!(storage.get_item("a").unwrap().as_deref(), Some("1"));
        storage.remove_item("a").unwrap();
        assert!(storage.get_item("a").unwrap().is_none());
    }

    #[test]
    fn test_quota_rejects_without_changing_existing_value() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "12345").unwrap();
        let err = storage.set_item("k", "1234567890").unwrap_err();
        assert!(err.is_quota_exceeded());
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("12345"));
    }

    #[test]
    fn test_overwrite_does_not_double_count() {
        let storage = MemoryStorage::with_quota(10);
        storage.set_item("k", "12345678").unwrap();
        storage.set_item("k", "87654321").unwrap();
        assert_eq!(storage.used_chars(), 9);
    }
}
