//! The envelope every cached payload is stored in.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<T> {
    pub data: T,
    pub stored_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
    /// Serialized payload length plus key length, in characters.
    pub size_bytes: usize,
}

impl<T> CacheEntry<T> {
    pub fn new(data: T, size_bytes: usize) -> Self {
        let now = Utc::now();
        Self {
            data,
            stored_at: now,
            access_count: 1,
            last_accessed_at: now,
            size_bytes,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.stored_at > ttl
    }

    /// Record one successful read.
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed_at = now;
    }
}

/// The bookkeeping fields of an entry, read without decoding its payload.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EntryStats {
    pub stored_at: DateTime<Utc>,
    pub access_count: u64,
    pub last_accessed_at: DateTime<Utc>,
    #[serde(default)]
    pub size_bytes: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_entry_counts_first_access() {
        let entry = CacheEntry::new("x", 10);
        assert_eq!(entry.access_count, 1);
        assert_eq!(entry.stored_at, entry.last_accessed_at);
    }

    #[test]
    fn test_expiry() {
        let mut entry = CacheEntry::new((), 0);
        let ttl = Duration::days(30);
        assert!(!entry.is_expired_at(Utc::now(), ttl));
        entry.stored_at = Utc::now() - Duration::days(31);
        assert!(entry.is_expired_at(Utc::now(), ttl));
    }

    #[test]
    fn test_stats_ignore_payload() {
        let entry = CacheEntry::new(vec![1, 2, 3], 42);
        let json = serde_json::to_string(&entry).unwrap();
        let stats: EntryStats = serde_json::from_str(&json).unwrap();
        assert_eq!(stats.access_count, 1);
        assert_eq!(stats.size_bytes, Some(42));
    }
}
