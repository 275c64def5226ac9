//! Application state: user settings and bookmarks.
//!
//! `AppState` owns one in-memory copy of each, loaded once from the shared
//! storage area and written back after every mutation. A mutation whose
//! write fails is rolled back, so memory never runs ahead of storage.

pub mod bookmarks;
pub mod settings;

use std::sync::Arc;

use thiserror::Error;
use tracing::warn;

use crate::storage::{KeyValueStorage, StorageError};

pub use bookmarks::{Bookmark, BookmarkError, Bookmarks, MAX_BOOKMARKS};
pub use settings::{FontSize, Settings, Theme};

pub const SETTINGS_KEY: &str = "hadith-settings";
pub const BOOKMARKS_KEY: &str = "hadith_bookmarks";

#[derive(Error, Debug)]
pub enum StateError {
    #[error("Failed to save. Storage might be full: {0}")]
    Storage(#[from] StorageError),

    #[error("Failed to encode state: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Invalid settings: {0}")]
    InvalidSettings(serde_json::Error),

    #[error(transparent)]
    Bookmark(#[from] BookmarkError),
}

pub struct AppState {
    storage: Arc<dyn KeyValueStorage>,
    settings: Settings,
    bookmarks: Bookmarks,
}

impl AppState {
    /// Load both stores. Missing, unreadable or corrupt data loads as
    /// defaults.
    pub fn load(storage: Arc<dyn KeyValueStorage>) -> Self {
        let settings = match read(storage.as_ref(), SETTINGS_KEY) {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                warn!(error = %e, "Stored settings are corrupt, using defaults");
                Settings::default()
            }),
            None => Settings::default(),
        };
        let bookmarks = read(storage.as_ref(), BOOKMARKS_KEY)
            .map(|raw| Bookmarks::from_json_lenient(&raw))
            .unwrap_or_default();

        Self {
            storage,
            settings,
            bookmarks,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn bookmarks(&self) -> &Bookmarks {
        &self.bookmarks
    }

    // ===== Settings =====

    /// Apply `f` to the settings and persist the result.
    pub fn update_settings<R>(&mut self, f: impl FnOnce(&mut Settings) -> R) -> Result<R, StateError> {
        let previous = self.settings.clone();
        let result = f(&mut self.settings);
        if let Err(e) = self.flush_settings() {
            self.settings = previous;
            return Err(e);
        }
        Ok(result)
    }

    pub fn import_settings(&mut self, json: &str) -> Result<(), StateError> {
        let mut imported = self.settings.clone();
        imported.import(json).map_err(StateError::InvalidSettings)?;
        self.update_settings(|s| *s = imported)
    }

    fn flush_settings(&self) -> Result<(), StateError> {
        let json = serde_json::to_string(&self.settings)?;
        self.storage.set_item(SETTINGS_KEY, &json)?;
        Ok(())
    }

    // ===== Bookmarks =====

    /// Apply `f` to the bookmarks and persist the result. Nothing is
    /// written when `f` fails.
    pub fn update_bookmarks<R>(
        &mut self,
        f: impl FnOnce(&mut Bookmarks) -> Result<R, BookmarkError>,
    ) -> Result<R, StateError> {
        let previous = self.bookmarks.clone();
        let result = match f(&mut self.bookmarks) {
            Ok(result) => result,
            Err(e) => {
                self.bookmarks = previous;
                return Err(e.into());
            }
        };
        if let Err(e) = self.flush_bookmarks() {
            self.bookmarks = previous;
            return Err(e);
        }
        Ok(result)
    }

    pub fn add_bookmark(&mut self, bookmark: Bookmark) -> Result<bool, StateError> {
        self.update_bookmarks(|b| b.add(bookmark))
    }

    pub fn remove_bookmark(&mut self, id: &str) -> Result<bool, StateError> {
        self.update_bookmarks(|b| Ok(b.remove(id)))
    }

    pub fn toggle_bookmark(&mut self, bookmark: Bookmark) -> Result<bool, StateError> {
        self.update_bookmarks(|b| b.toggle(bookmark))
    }

    pub fn update_bookmark_notes(&mut self, id: &str, notes: &str) -> Result<bool, StateError> {
        self.update_bookmarks(|b| Ok(b.update_notes(id, notes)))
    }

    pub fn update_bookmark_tags(&mut self, id: &str, tags: Vec<String>) -> Result<bool, StateError> {
        self.update_bookmarks(|b| Ok(b.update_tags(id, tags)))
    }

    pub fn clear_bookmarks(&mut self) -> Result<(), StateError> {
        self.update_bookmarks(|b| {
            b.clear();
            Ok(())
        })
    }

    pub fn import_bookmarks(&mut self, json: &str) -> Result<usize, StateError> {
        self.update_bookmarks(|b| b.import(json))
    }

    fn flush_bookmarks(&self) -> Result<(), StateError> {
        let json = self.bookmarks.to_json()?;
        self.storage.set_item(BOOKMARKS_KEY, &json)?;
        Ok(())
    }
}

fn read(storage: &dyn KeyValueStorage, key: &str) -> Option<String> {
    match storage.get_item(key) {
        Ok(value) => value,
        Err(e) => {
            warn!(key, error = %e, "Failed to read stored state");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HadithNumber;
    use crate::storage::{DisabledStorage, MemoryStorage};
    use chrono::Utc;

    fn bookmark(number: u32) -> Bookmark {
        let n = HadithNumber::from(number);
        Bookmark {
            id: Bookmark::id_for("bukhari", n),
            hadith_number: n,
            book_key: "bukhari".to_string(),
            book_name: "Sahih al Bukhari".to_string(),
            section_id: None,
            section_name: None,
            hadith_text: "text".to_string(),
            arabic_text: None,
            grade: None,
            date_added: Utc::now(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_mutations_are_persisted() {
        let storage = Arc::new(MemoryStorage::new());
        let mut state = AppState::load(storage.clone());
        state.update_settings(|s| s.toggle_theme()).unwrap();
        state.add_bookmark(bookmark(1)).unwrap();

        let reloaded = AppState::load(storage);
        assert_eq!(reloaded.settings().theme, Theme::Light);
        assert!(reloaded.bookmarks().contains("bukhari-1"));
    }

    #[test]
    fn test_corrupt_state_loads_defaults() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(SETTINGS_KEY, "{{{").unwrap();
        storage.set_item(BOOKMARKS_KEY, "nope").unwrap();

        let state = AppState::load(storage);
        assert_eq!(state.settings(), &Settings::default());
        assert!(state.bookmarks().is_empty());
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut state = AppState::load(Arc::new(DisabledStorage));
        let err = state.update_settings(|s| s.cycle_color_themes()).unwrap_err();
        assert!(matches!(err, StateError::Storage(_)));
        assert_eq!(state.settings().theme, Theme::System);

        assert!(state.add_bookmark(bookmark(1)).is_err());
        assert!(state.bookmarks().is_empty());
    }

    #[test]
    fn test_import_settings_rejects_invalid_json() {
        let storage = Arc::new(MemoryStorage::new());
        let mut state = AppState::load(storage);
        assert!(matches!(
            state.import_settings("oops"),
            Err(StateError::InvalidSettings(_))
        ));
        state.import_settings(r#"{"language": "urd"}"#).unwrap();
        assert_eq!(state.settings().language, "urd");
    }
}
