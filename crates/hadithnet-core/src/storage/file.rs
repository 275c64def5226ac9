//! Directory-backed key/value storage.
//!
//! Each key is stored in its own file named after the hex encoding of the
//! key, so arbitrary keys map to safe file names and `keys()` can recover
//! them. Writes go to a temporary file that is renamed into place.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use tracing::{debug, warn};

use super::{entry_chars, KeyValueStorage, StorageError, DEFAULT_QUOTA_CHARS};

/// Extension for committed entries.
const ENTRY_EXT: &str = "kv";

/// Extension for in-flight writes.
const TEMP_EXT: &str = "tmp";

pub struct FileStorage {
    dir: PathBuf,
    quota_chars: usize,
    write_lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(dir: PathBuf) -> Result<Self, StorageError> {
        Self::with_quota(dir, DEFAULT_QUOTA_CHARS)
    }

    pub fn with_quota(dir: PathBuf, quota_chars: usize) -> Result<Self, StorageError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            quota_chars,
            write_lock: Mutex::new(()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", hex::encode(key), ENTRY_EXT))
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.write_lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn key_from_path(path: &Path) -> Option<String> {
        if path.extension().and_then(|e| e.to_str()) != Some(ENTRY_EXT) {
            return None;
        }
        let stem = path.file_stem()?.to_str()?;
        let bytes = hex::decode(stem).ok()?;
        String::from_utf8(bytes).ok()
    }

    /// Characters used by every key except `excluding`.
    fn used_chars_excluding(&self, excluding: &str) -> Result<usize, StorageError> {
        let mut used = 0;
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            let Some(key) = Self::key_from_path(&path) else {
                continue;
            };
            if key == excluding {
                continue;
            }
            match std::fs::read_to_string(&path) {
                Ok(value) => used += entry_chars(&key, &value),
                Err(e) => debug!(path = %path.display(), error = %e, "Skipping unreadable entry"),
            }
        }
        Ok(used)
    }
}

impl KeyValueStorage for FileStorage {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        match std::fs::read_to_string(self.entry_path(key)) {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock_writes();

        let used = self.used_chars_excluding(key)?;
        let requested = entry_chars(key, value);
        if used + requested > self.quota_chars {
            return Err(StorageError::QuotaExceeded {
                requested,
                available: self.quota_chars.saturating_sub(used),
            });
        }

        let path = self.entry_path(key);
        let temp = path.with_extension(TEMP_EXT);
        std::fs::write(&temp, value)?;
        if let Err(e) = std::fs::rename(&temp, &path) {
            if let Err(cleanup) = std::fs::remove_file(&temp) {
                warn!(path = %temp.display(), error = %cleanup, "Failed to remove temp file");
            }
            return Err(e.into());
        }
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock_writes();
        match std::fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        let mut keys = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            if let Some(key) = Self::key_from_path(&entry?.path()) {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}
