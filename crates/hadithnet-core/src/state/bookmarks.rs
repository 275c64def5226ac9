//! Saved hadiths.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::models::{CombinedHadith, HadithNumber};

/// Maximum number of bookmarks kept.
pub const MAX_BOOKMARKS: usize = 1000;

#[derive(Error, Debug)]
pub enum BookmarkError {
    #[error("Maximum {max} bookmarks allowed")]
    LimitReached { max: usize },

    #[error("Invalid bookmark data: {0}")]
    InvalidImport(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct Bookmark {
    pub id: String,
    pub hadith_number: HadithNumber,
    pub book_key: String,
    pub book_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_name: Option<String>,
    pub hadith_text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arabic_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grade: Option<String>,
    pub date_added: DateTime<Utc>,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

impl Bookmark {
    pub fn id_for(book_key: &str, number: HadithNumber) -> String {
        format!("{}-{}", book_key, number)
    }

    pub fn from_combined(
        hadith: &CombinedHadith,
        book_key: &str,
        book_name: &str,
        section: Option<(&str, &str)>,
    ) -> Self {
        let number = hadith.number();
        Self {
            id: Self::id_for(book_key, number),
            hadith_number: number,
            book_key: book_key.to_string(),
            book_name: book_name.to_string(),
            section_id: section.map(|(id, _)| id.to_string()),
            section_name: section.map(|(_, name)| name.to_string()),
            hadith_text: hadith.translation.text.clone(),
            arabic_text: Some(hadith.arabic.text.clone()),
            grade: hadith.translation.primary_grade().map(str::to_string),
            date_added: Utc::now(),
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    /// Has the identifying fields a stored bookmark needs.
    fn is_valid(&self) -> bool {
        !self.id.is_empty()
            && !self.book_key.is_empty()
            && !self.book_name.is_empty()
            && self.hadith_number.value() != 0.0
    }

    fn matches(&self, term: &str, raw_query: &str) -> bool {
        let contains = |s: &str| s.to_lowercase().contains(term);
        contains(&self.hadith_text)
            || self.arabic_text.as_deref().is_some_and(contains)
            || contains(&self.book_name)
            || self.section_name.as_deref().is_some_and(contains)
            || contains(&self.notes)
            || self.tags.iter().any(|t| contains(t))
            || self.hadith_number.to_string().contains(raw_query)
    }
}

/// Bookmarks, newest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Bookmarks {
    items: Vec<Bookmark>,
}

impl Bookmarks {
    /// Parse a stored list, dropping entries that don't deserialize or lack
    /// identifying fields. Anything but a JSON array yields an empty list.
    pub fn from_json_lenient(json: &str) -> Self {
        let items = match serde_json::from_str::<Value>(json) {
            Ok(Value::Array(values)) => Self::valid_entries(values),
            Ok(_) | Err(_) => {
                debug!("Stored bookmarks are not a list, starting empty");
                Vec::new()
            }
        };
        Self { items }
    }

    fn valid_entries(values: Vec<Value>) -> Vec<Bookmark> {
        values
            .into_iter()
            .filter_map(|v| serde_json::from_value::<Bookmark>(v).ok())
            .filter(Bookmark::is_valid)
            .collect()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(&self.items)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bookmark> {
        self.items.iter()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.items.iter().any(|b| b.id == id)
    }

    pub fn get(&self, id: &str) -> Option<&Bookmark> {
        self.items.iter().find(|b| b.id == id)
    }

    /// Insert at the front. `Ok(false)` when the id is already bookmarked.
    pub fn add(&mut self, bookmark: Bookmark) -> Result<bool, BookmarkError> {
        if self.contains(&bookmark.id) {
            return Ok(false);
        }
        if self.items.len() >= MAX_BOOKMARKS {
            return Err(BookmarkError::LimitReached { max: MAX_BOOKMARKS });
        }
        self.items.insert(0, bookmark);
        Ok(true)
    }

    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|b| b.id != id);
        self.items.len() != before
    }

    /// Remove when present, add otherwise. Returns whether it is now bookmarked.
    pub fn toggle(&mut self, bookmark: Bookmark) -> Result<bool, BookmarkError> {
        if self.remove(&bookmark.id) {
            Ok(false)
        } else {
            self.add(bookmark)
        }
    }

    pub fn update_notes(&mut self, id: &str, notes: &str) -> bool {
        match self.items.iter_mut().find(|b| b.id == id) {
            Some(bookmark) => {
                bookmark.notes = notes.to_string();
                true
            }
            None => false,
        }
    }

    pub fn update_tags(&mut self, id: &str, tags: Vec<String>) -> bool {
        match self.items.iter_mut().find(|b| b.id == id) {
            Some(bookmark) => {
                bookmark.tags = tags;
                true
            }
            None => false,
        }
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn by_book(&self, book_key: &str) -> Vec<&Bookmark> {
        self.items.iter().filter(|b| b.book_key == book_key).collect()
    }

    /// Case-insensitive match over text, notes, tags and names, or the
    /// hadith number. An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&Bookmark> {
        if query.trim().is_empty() {
            return self.items.iter().collect();
        }
        let term = query.to_lowercase();
        self.items.iter().filter(|b| b.matches(&term, query)).collect()
    }

    pub fn export(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.items)
    }

    /// Append valid, not-yet-present bookmarks from an exported list.
    /// Returns how many were added; stops at the bookmark cap.
    pub fn import(&mut self, json: &str) -> Result<usize, BookmarkError> {
        let values: Vec<Value> = serde_json::from_str(json)?;
        let mut added = 0;
        for bookmark in Self::valid_entries(values) {
            if self.contains(&bookmark.id) {
                continue;
            }
            if self.items.len() >= MAX_BOOKMARKS {
                break;
            }
            self.items.push(bookmark);
            added += 1;
        }
        Ok(added)
    }
}
