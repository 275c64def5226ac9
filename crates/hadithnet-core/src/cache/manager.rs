use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use super::entry::{CacheEntry, EntryStats};
use crate::storage::{entry_chars, KeyValueStorage, StorageError, DEFAULT_QUOTA_CHARS};

/// Prefix reserving the cache's share of the storage area.
pub const CACHE_PREFIX: &str = "hadith_cache_";

/// Percentage of `max_items` evicted by a routine cleanup.
const CLEANUP_PERCENT: usize = 50;

/// Percentage evicted when usage crosses the high-water mark before a write.
const AGGRESSIVE_CLEANUP_PERCENT: usize = 60;

/// Percentage evicted by `ensure_cache_size` once the item cap is reached.
const CAP_CLEANUP_PERCENT: usize = 30;

/// Size at which the size component of the eviction score reaches 1.0.
const SIZE_NORMALIZER: f64 = 100.0 * 1024.0;

/// Size assumed for entries written without a recorded size.
const DEFAULT_ENTRY_SIZE: usize = 1000;

/// Headroom `can_cache` requires beyond the item itself.
const CAN_CACHE_HEADROOM: usize = 1000;

/// Usage percentage above which `can_cache` refuses.
const CAN_CACHE_MAX_PERCENT: f64 = 90.0;

const AGE_WEIGHT: f64 = 0.4;
const FREQUENCY_WEIGHT: f64 = 0.4;
const SIZE_WEIGHT: f64 = 0.2;

/// Cleanup passes tried, in order, when a write hits the storage quota.
const QUOTA_RECOVERY_PASSES: [CleanupPass; 3] = [
    CleanupPass::Expire,
    CleanupPass::Evict(CLEANUP_PERCENT),
    CleanupPass::Evict(80),
];

#[derive(Debug, Clone, Copy)]
enum CleanupPass {
    Expire,
    Evict(usize),
}

#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Failed to serialize cache entry: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Storage quota exceeded for {key} after cleanup")]
    QuotaExceeded { key: String },

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Result of a `set` call that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOutcome {
    Stored,
    Skipped(SkipReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Serialized entry exceeds the per-item ceiling.
    TooLarge { size: usize },
    /// Storage is disabled or failed the availability probe.
    Unavailable,
    /// Empty key.
    InvalidKey,
}

/// Tunable bounds. `Default` carries the production values.
#[derive(Debug, Clone)]
pub struct CacheLimits {
    pub ttl: Duration,
    pub max_items: usize,
    pub max_item_size: usize,
    /// Assumed storage ceiling, in characters.
    pub storage_ceiling: usize,
    /// Usage fraction of `storage_ceiling` that triggers aggressive cleanup.
    pub high_water_mark: f64,
    /// Minimum gap between persisted access-stat updates for one entry.
    pub stats_refresh_interval: Duration,
}

impl Default for CacheLimits {
    fn default() -> Self {
        Self {
            ttl: Duration::days(30),
            max_items: 30,
            max_item_size: 500 * 1024,
            storage_ceiling: DEFAULT_QUOTA_CHARS,
            high_water_mark: 0.8,
            stats_refresh_interval: Duration::minutes(5),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub total_items: usize,
    pub total_size: usize,
    pub oldest_item: Option<DateTime<Utc>>,
    pub newest_item: Option<DateTime<Utc>>,
    pub storage_usage_percentage: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StorageInfo {
    pub used: usize,
    pub percentage: f64,
    pub available: usize,
}

/// Size- and age-bounded cache over the shared key/value storage.
///
/// Only keys under `CACHE_PREFIX` are ever read, counted or deleted. Every
/// failure degrades to a miss or a skipped write; `set` reports an error only
/// when the quota could not be recovered.
pub struct CacheManager {
    storage: Arc<dyn KeyValueStorage>,
    available: bool,
    limits: CacheLimits,
}

impl CacheManager {
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_limits(storage, CacheLimits::default())
    }

    /// Availability is probed once here, so a nearly full storage area
    /// still gets evictions rather than silently skipped writes.
    pub fn with_limits(storage: Arc<dyn KeyValueStorage>, limits: CacheLimits) -> Self {
        let available = storage.is_available();
        if !available {
            warn!("Persistent storage unavailable, caching disabled");
        }
        Self {
            storage,
            available,
            limits,
        }
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn limits(&self) -> &CacheLimits {
        &self.limits
    }

    fn storage_key(key: &str) -> String {
        format!("{}{}", CACHE_PREFIX, key)
    }

    /// Remove a namespaced key, logging rather than failing.
    fn discard(&self, storage_key: &str) {
        if let Err(e) = self.storage.remove_item(storage_key) {
            debug!(key = storage_key, error = %e, "Failed to remove cache entry");
        }
    }

    /// Namespaced keys currently held by the cache.
    fn cache_keys(&self) -> Vec<String> {
        if !self.available {
            return Vec::new();
        }
        match self.storage.keys() {
            Ok(keys) => keys
                .into_iter()
                .filter(|k| k.starts_with(CACHE_PREFIX))
                .collect(),
            Err(e) => {
                warn!(error = %e, "Failed to enumerate cache keys");
                Vec::new()
            }
        }
    }

    // ===== Read / Write =====

    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        if !self.available || key.is_empty() {
            return None;
        }
        let storage_key = Self::storage_key(key);

        let raw = match self.storage.get_item(&storage_key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!(key, error = %e, "Cache read failed");
                return None;
            }
        };

        let mut entry: CacheEntry<Value> = match serde_json::from_str(&raw) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(key, error = %e, "Removing corrupted cache entry");
                self.discard(&storage_key);
                return None;
            }
        };

        let now = Utc::now();
        if entry.is_expired_at(now, self.limits.ttl) {
            debug!(key, "Cache entry expired");
            self.discard(&storage_key);
            return None;
        }

        let persisted_access = entry.last_accessed_at;
        entry.touch(now);
        if now - persisted_access > self.limits.stats_refresh_interval {
            self.persist_stats(&storage_key, &entry);
        }

        match serde_json::from_value(entry.data) {
            Ok(data) => Some(data),
            Err(e) => {
                warn!(key, error = %e, "Cached payload has unexpected shape, removing");
                self.discard(&storage_key);
                None
            }
        }
    }

    fn persist_stats(&self, storage_key: &str, entry: &CacheEntry<Value>) {
        match serde_json::to_string(entry) {
            Ok(serialized) => {
                if let Err(e) = self.storage.set_item(storage_key, &serialized) {
                    debug!(key = storage_key, error = %e, "Failed to update cache stats");
                }
            }
            Err(e) => debug!(key = storage_key, error = %e, "Failed to encode cache stats"),
        }
    }

    pub fn set<T: Serialize>(&self, key: &str, data: &T) -> Result<SetOutcome, CacheError> {
        if !self.available {
            return Ok(SetOutcome::Skipped(SkipReason::Unavailable));
        }
        if key.is_empty() {
            warn!("Refusing to cache under an empty key");
            return Ok(SetOutcome::Skipped(SkipReason::InvalidKey));
        }

        let payload = serde_json::to_string(data)?;
        let size = entry_chars(key, &payload);
        if size > self.limits.max_item_size {
            warn!(key, size, "Item too large to cache");
            return Ok(SetOutcome::Skipped(SkipReason::TooLarge { size }));
        }

        let storage_key = Self::storage_key(key);
        let serialized = serde_json::to_string(&CacheEntry::new(data, size))?;

        if self.is_near_storage_limit() {
            info!("Cache near storage limit, running aggressive cleanup");
            self.aggressive_cleanup();
        }

        match self.storage.set_item(&storage_key, &serialized) {
            Ok(()) => return Ok(SetOutcome::Stored),
            Err(e) if e.is_quota_exceeded() => {
                warn!(key, "Storage quota exceeded, attempting cleanup");
            }
            Err(e) => return Err(e.into()),
        }

        for pass in QUOTA_RECOVERY_PASSES {
            self.run_pass(pass);
            match self.storage.set_item(&storage_key, &serialized) {
                Ok(()) => {
                    debug!(key, ?pass, "Cached after cleanup");
                    return Ok(SetOutcome::Stored);
                }
                Err(e) if e.is_quota_exceeded() => continue,
                Err(e) => return Err(e.into()),
            }
        }

        error!(key, "Failed to cache data after cleanup");
        Err(CacheError::QuotaExceeded {
            key: key.to_string(),
        })
    }

    pub fn remove(&self, key: &str) {
        if self.available && !key.is_empty() {
            self.discard(&Self::storage_key(key));
        }
    }

    // ===== Cleanup =====

    fn evict_count(&self, percent: usize) -> usize {
        (self.limits.max_items * percent).div_ceil(100)
    }

    fn run_pass(&self, pass: CleanupPass) -> usize {
        match pass {
            CleanupPass::Expire => self.clear_expired(),
            CleanupPass::Evict(percent) => self.clear_least_used(self.evict_count(percent)),
        }
    }

    fn aggressive_cleanup(&self) {
        let expired = self.clear_expired();
        let evicted = self.clear_least_used(self.evict_count(AGGRESSIVE_CLEANUP_PERCENT));
        info!(expired, evicted, "Aggressive cache cleanup finished");
    }

    /// Estimated usage has crossed the high-water mark of the assumed ceiling.
    fn is_near_storage_limit(&self) -> bool {
        let used = self.estimated_usage() as f64;
        used / self.limits.storage_ceiling as f64 > self.limits.high_water_mark
    }

    /// Sum of key and value lengths of every cache entry.
    fn estimated_usage(&self) -> usize {
        self.cache_keys()
            .iter()
            .filter_map(|k| match self.storage.get_item(k) {
                Ok(Some(value)) => Some(entry_chars(k, &value)),
                _ => None,
            })
            .sum()
    }

    /// Read the bookkeeping fields of every entry, removing unreadable ones.
    fn scan(&self) -> Vec<(String, EntryStats)> {
        let mut entries = Vec::new();
        for key in self.cache_keys() {
            let raw = match self.storage.get_item(&key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(e) => {
                    debug!(key = %key, error = %e, "Skipping unreadable cache entry");
                    continue;
                }
            };
            match serde_json::from_str::<EntryStats>(&raw) {
                Ok(stats) => entries.push((key, stats)),
                Err(_) => {
                    warn!(key = %key, "Removing corrupted cache entry");
                    self.discard(&key);
                }
            }
        }
        entries
    }

    /// Delete the `count` entries with the highest eviction score.
    pub fn clear_least_used(&self, count: usize) -> usize {
        if count == 0 {
            return 0;
        }
        let now = Utc::now();
        let mut scored: Vec<(String, f64)> = self
            .scan()
            .into_iter()
            .map(|(key, stats)| {
                let score = eviction_score(&stats, now, self.limits.ttl);
                (key, score)
            })
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));

        let mut removed = 0;
        for (key, _) in scored.into_iter().take(count) {
            match self.storage.remove_item(&key) {
                Ok(()) => removed += 1,
                Err(e) => debug!(key = %key, error = %e, "Failed to evict cache entry"),
            }
        }
        if removed > 0 {
            info!(removed, "Cleaned up least used cache items");
        }
        removed
    }

    pub fn clear_expired(&self) -> usize {
        let now = Utc::now();
        let mut removed = 0;
        for (key, stats) in self.scan() {
            if now - stats.stored_at > self.limits.ttl {
                self.discard(&key);
                removed += 1;
            }
        }
        if removed > 0 {
            info!(removed, "Cleared expired cache items");
        }
        removed
    }

    /// Delete every cache entry. Other keys in the storage area are untouched.
    pub fn clear_all(&self) -> usize {
        let keys = self.cache_keys();
        for key in &keys {
            self.discard(key);
        }
        info!(removed = keys.len(), "Cleared cache");
        keys.len()
    }

    /// Evict 30% of the item cap once the cache holds `max_items` entries.
    pub fn ensure_cache_size(&self) -> usize {
        let items = self.cache_keys().len();
        if items >= self.limits.max_items {
            info!(items, max = self.limits.max_items, "Cache at capacity");
            self.clear_least_used(self.evict_count(CAP_CLEANUP_PERCENT))
        } else {
            0
        }
    }

    // ===== Reporting =====

    pub fn stats(&self) -> CacheStats {
        let mut stats = CacheStats::default();
        for key in self.cache_keys() {
            let Ok(Some(raw)) = self.storage.get_item(&key) else {
                continue;
            };
            stats.total_items += 1;
            stats.total_size += entry_chars(&key, &raw);
            if let Ok(entry) = serde_json::from_str::<EntryStats>(&raw) {
                let at = entry.stored_at;
                stats.oldest_item = Some(stats.oldest_item.map_or(at, |o| o.min(at)));
                stats.newest_item = Some(stats.newest_item.map_or(at, |n| n.max(at)));
            }
        }
        stats.storage_usage_percentage = self.percentage_of_ceiling(stats.total_size);
        stats
    }

    pub fn storage_info(&self) -> StorageInfo {
        let used = self.estimated_usage();
        StorageInfo {
            used,
            percentage: self.percentage_of_ceiling(used),
            available: self.limits.storage_ceiling.saturating_sub(used),
        }
    }

    /// Whether an item of `size` characters fits with headroom to spare.
    pub fn can_cache(&self, size: usize) -> bool {
        if !self.available {
            return false;
        }
        let info = self.storage_info();
        info.available > size + CAN_CACHE_HEADROOM && info.percentage < CAN_CACHE_MAX_PERCENT
    }

    fn percentage_of_ceiling(&self, used: usize) -> f64 {
        if self.limits.storage_ceiling == 0 {
            return 100.0;
        }
        used as f64 / self.limits.storage_ceiling as f64 * 100.0
    }
}

/// Retention score of one entry; higher means evicted sooner.
///
/// Blends time since last access (relative to the TTL), inverse access
/// frequency and size (relative to 100 KiB).
fn eviction_score(stats: &EntryStats, now: DateTime<Utc>, ttl: Duration) -> f64 {
    let idle_ms = (now - stats.last_accessed_at).num_milliseconds().max(0) as f64;
    let ttl_ms = ttl.num_milliseconds().max(1) as f64;
    let age_score = idle_ms / ttl_ms;
    let frequency_score = 1.0 / (stats.access_count as f64 + 1.0);
    let size = stats.size_bytes.unwrap_or(DEFAULT_ENTRY_SIZE) as f64;
    let size_score = size / SIZE_NORMALIZER;

    age_score * AGE_WEIGHT + frequency_score * FREQUENCY_WEIGHT + size_score * SIZE_WEIGHT
}

// ============================================================================
// Tests
// ============================================================================
