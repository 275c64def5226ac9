//! Canonical cache keys.

use std::fmt;

/// Structured descriptor of a cacheable request.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// The editions catalogue
    Editions,
    /// One book in one language
    Hadith { book: String, language: String },
}

impl CacheKey {
    /// Build a per-book key. Book ids are case-insensitive; both parts are trimmed.
    pub fn hadith(book: &str, language: &str) -> Self {
        Self::Hadith {
            book: book.trim().to_lowercase(),
            language: language.trim().to_string(),
        }
    }

    /// Storage key for this request, without the cache namespace prefix.
    ///
    /// Components have `%` and `_` escaped, so `_` only ever appears as a
    /// separator and distinct descriptors never share a key.
    pub fn to_storage_key(&self) -> String {
        match self {
            Self::Editions => "editions".to_string(),
            Self::Hadith { book, language } => format!(
                "hadith_{}_{}",
                escape_component(book),
                escape_component(language)
            ),
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_storage_key())
    }
}

fn escape_component(component: &str) -> String {
    let mut escaped = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '_' => escaped.push_str("%5F"),
            _ => escaped.push(c),
        }
    }
    escaped
}
