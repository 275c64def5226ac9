//! Client-side caching of the hadith dataset.
//!
//! This module provides the `CacheManager`, a size- and age-bounded cache
//! over the shared key/value storage. Entries expire after 30 days, and
//! storage pressure is handled by evicting the least valuable entries
//! (a blend of recency, access frequency and size).
//!
//! Cached data types include:
//! - The editions catalogue
//! - Per-book hadith data for one language

pub mod entry;
pub mod key;
pub mod manager;

pub use entry::CacheEntry;
pub use key::CacheKey;
pub use manager::{
    CacheError, CacheLimits, CacheManager, CacheStats, SetOutcome, SkipReason, StorageInfo,
    CACHE_PREFIX,
};
