//! Data models for the hadith dataset.
//!
//! This module contains the data structures used to represent the
//! remote dataset and the values derived from it:
//!
//! - `Editions`, `Edition`, `Collection`: the catalogue of hadith collections
//! - `HadithBook`, `Metadata`, `SectionDetail`, `Hadith`: one book in one language
//! - `CombinedHadith`: original-language text joined with a translation
//! - Language helpers: display names and collection-name parsing
//! - Admin translation-update payloads

pub mod admin;
pub mod edition;
pub mod hadith;
pub mod language;

pub use admin::{AdminEndpointStatus, UpdateTranslationRequest, UpdateTranslationResponse};
pub use edition::{Collection, Edition, Editions};
pub use hadith::{
    BookStats, CombinedHadith, Grade, Hadith, HadithBook, HadithNumber, Metadata, Reference,
    SectionDetail, TranslationSource,
};
pub use language::{extract_language_code, language_info, LanguageInfo, ORIGINAL_LANGUAGE};
