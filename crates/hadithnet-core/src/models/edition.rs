//! Edition catalogue as served by `GET /api/editions`.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// All known collections keyed by book id (e.g. `bukhari`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct Editions(pub BTreeMap<String, Edition>);

impl Editions {
    pub fn get(&self, book: &str) -> Option<&Edition> {
        self.0.get(book)
    }

    /// Case-insensitive check that a book id exists in the catalogue.
    pub fn contains_book(&self, book: &str) -> bool {
        self.0.keys().any(|key| key.eq_ignore_ascii_case(book))
    }

    pub fn book_ids(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// A named hadith collection with one sub-collection per language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Edition {
    pub name: String,
    #[serde(default)]
    pub collection: Vec<Collection>,
}

impl Edition {
    /// Language codes this edition is published in, in catalogue order.
    pub fn languages(&self) -> Vec<String> {
        self.collection.iter().map(|c| c.language_code()).collect()
    }

    /// Display names of the languages this edition is published in.
    pub fn language_names(&self) -> Vec<String> {
        self.collection.iter().map(|c| c.language_name()).collect()
    }
}

/// One language sub-collection of an edition (e.g. `eng-bukhari`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Collection {
    pub name: String,
    #[serde(default)]
    pub book: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub has_sections: bool,
    #[serde(default)]
    pub direction: String,
    #[serde(default)]
    pub source: String,
    #[serde(default)]
    pub comments: String,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub linkmin: String,
}

impl Collection {
    /// Three-letter language code, taken from the collection name prefix.
    pub fn language_code(&self) -> String {
        super::extract_language_code(&self.name).to_string()
    }

    /// The catalogue's language name, or the name known for the code when
    /// the catalogue leaves it blank.
    pub fn language_name(&self) -> String {
        if !self.language.trim().is_empty() {
            return self.language.clone();
        }
        let code = self.language_code();
        super::language_info(&code)
            .map(|info| info.name.to_string())
            .unwrap_or(code)
    }
}
