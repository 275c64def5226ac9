//! Named response caches, the worker-side counterpart of the browser's
//! `caches` object.
//!
//! Each `ResponseCache` maps a request URL to the response stored for it.
//! `CacheStorage` holds the caches by name and is shared between the worker
//! and its background refresh tasks. A storage opened on a directory keeps
//! one JSON file per cache there and rewrites it after every change, so the
//! caches survive a restart.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::WorkerResponse;
use crate::storage::StorageError;

/// Extension of persisted cache files.
const CACHE_EXT: &str = "json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CachedResponse {
    pub response: WorkerResponse,
    pub cached_at: DateTime<Utc>,
}

/// One named cache: URL -> response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseCache {
    entries: BTreeMap<String, CachedResponse>,
}

impl ResponseCache {
    pub fn put(&mut self, url: &str, response: WorkerResponse) {
        self.entries.insert(
            url.to_string(),
            CachedResponse {
                response,
                cached_at: Utc::now(),
            },
        );
    }

    pub fn match_url(&self, url: &str) -> Option<&CachedResponse> {
        self.entries.get(url)
    }

    pub fn delete(&mut self, url: &str) -> bool {
        self.entries.remove(url).is_some()
    }

    pub fn keys(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Body bytes held by this cache.
    pub fn size(&self) -> usize {
        self.entries.values().map(|e| e.response.body.len()).sum()
    }
}

/// All named caches of one origin.
#[derive(Debug, Default)]
pub struct CacheStorage {
    caches: RwLock<BTreeMap<String, ResponseCache>>,
    dir: Option<PathBuf>,
}

impl CacheStorage {
    /// Caches held in memory only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Caches persisted under `dir`, loading whatever an earlier run left
    /// there. Unreadable cache files are skipped.
    pub fn persistent(dir: PathBuf) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;

        let mut caches = BTreeMap::new();
        for entry in std::fs::read_dir(&dir)? {
            let path = entry?.path();
            let Some(name) = cache_name_from_path(&path) else {
                continue;
            };
            let loaded = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|raw| {
                    serde_json::from_str::<ResponseCache>(&raw).map_err(|e| e.to_string())
                });
            match loaded {
                Ok(cache) => {
                    debug!(cache = %name, entries = cache.len(), "Loaded response cache");
                    caches.insert(name, cache);
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Skipping unreadable response cache")
                }
            }
        }

        Ok(Self {
            caches: RwLock::new(caches),
            dir: Some(dir),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, ResponseCache>> {
        self.caches.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, ResponseCache>> {
        self.caches.write().unwrap_or_else(|e| e.into_inner())
    }

    /// Write one cache to disk, or remove its file when `cache` is `None`.
    /// Failures are logged; the in-memory copy stays authoritative.
    fn persist(&self, cache_name: &str, cache: Option<&ResponseCache>) {
        let Some(dir) = &self.dir else {
            return;
        };
        let path = dir.join(format!("{}.{}", hex::encode(cache_name), CACHE_EXT));
        let result = match cache {
            Some(cache) => write_atomic(&path, cache),
            None => match std::fs::remove_file(&path) {
                Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e.into()),
                _ => Ok(()),
            },
        };
        if let Err(e) = result {
            warn!(cache = cache_name, error = %e, "Failed to persist response cache");
        }
    }

    /// Create the named cache if it does not exist yet.
    pub fn open(&self, cache_name: &str) {
        let mut caches = self.write();
        if !caches.contains_key(cache_name) {
            let cache = caches.entry(cache_name.to_string()).or_default();
            self.persist(cache_name, Some(&*cache));
        }
    }

    pub fn has(&self, cache_name: &str) -> bool {
        self.read().contains_key(cache_name)
    }

    pub fn delete(&self, cache_name: &str) -> bool {
        let removed = self.write().remove(cache_name).is_some();
        if removed {
            self.persist(cache_name, None);
        }
        removed
    }

    /// Cache names in sorted order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    /// Store a response, creating the cache if needed.
    pub fn put(&self, cache_name: &str, url: &str, response: WorkerResponse) {
        let mut caches = self.write();
        let cache = caches.entry(cache_name.to_string()).or_default();
        cache.put(url, response);
        self.persist(cache_name, Some(&*cache));
    }

    pub fn match_in(&self, cache_name: &str, url: &str) -> Option<WorkerResponse> {
        self.read()
            .get(cache_name)?
            .match_url(url)
            .map(|e| e.response.clone())
    }

    /// First hit for `url` across the given caches, in order.
    pub fn match_any(&self, cache_names: &[&str], url: &str) -> Option<WorkerResponse> {
        let caches = self.read();
        cache_names.iter().find_map(|name| {
            caches
                .get(*name)
                .and_then(|c| c.match_url(url))
                .map(|e| e.response.clone())
        })
    }

    /// Entry count and body bytes per cache.
    pub fn summary(&self) -> Vec<(String, usize, usize)> {
        self.read()
            .iter()
            .map(|(name, cache)| (name.clone(), cache.len(), cache.size()))
            .collect()
    }
}

fn cache_name_from_path(path: &Path) -> Option<String> {
    if path.extension().and_then(|e| e.to_str()) != Some(CACHE_EXT) {
        return None;
    }
    let bytes = hex::decode(path.file_stem()?.to_str()?).ok()?;
    String::from_utf8(bytes).ok()
}

fn write_atomic(path: &Path, cache: &ResponseCache) -> Result<(), StorageError> {
    let json = serde_json::to_string(cache).map_err(std::io::Error::other)?;
    let temp = path.with_extension("tmp");
    std::fs::write(&temp, json)?;
    std::fs::rename(&temp, path)?;
    Ok(())
}
