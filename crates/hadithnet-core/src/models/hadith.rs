//! Per-book hadith data as served by `GET /api/hadith`.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Hadith and section numbers.
///
/// The dataset stores these as JSON numbers, and a few collections use
/// fractional numbering (e.g. `7.1`), so this wraps an `f64` rather than an
/// integer. Integral values display without a decimal point.
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(transparent)]
pub struct HadithNumber(pub f64);

impl HadithNumber {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl From<u32> for HadithNumber {
    fn from(n: u32) -> Self {
        Self(f64::from(n))
    }
}

impl fmt::Display for HadithNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.fract() == 0.0 && self.0.abs() < 1e15 {
            write!(f, "{}", self.0 as i64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// One book in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct HadithBook {
    pub metadata: Metadata,
    #[serde(default)]
    pub hadiths: Vec<Hadith>,
}

impl HadithBook {
    pub fn find(&self, number: HadithNumber) -> Option<&Hadith> {
        self.hadiths.iter().find(|h| h.hadithnumber == number)
    }

    /// Section ids in numeric order, skipping the `"0"` placeholder section
    /// some books use for introductory material without a title.
    pub fn section_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .metadata
            .sections
            .iter()
            .filter(|(id, name)| !(id.as_str() == "0" && name.is_empty()))
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_by(|a, b| {
            let a_num = a.parse::<f64>().unwrap_or(f64::MAX);
            let b_num = b.parse::<f64>().unwrap_or(f64::MAX);
            a_num.total_cmp(&b_num)
        });
        ids
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub sections: BTreeMap<String, String>,
    #[serde(default)]
    pub section_details: BTreeMap<String, SectionDetail>,
}

/// Range of hadith numbers registered for a section.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct SectionDetail {
    pub hadithnumber_first: HadithNumber,
    pub hadithnumber_last: HadithNumber,
    #[serde(default)]
    pub arabicnumber_first: HadithNumber,
    #[serde(default)]
    pub arabicnumber_last: HadithNumber,
}

impl SectionDetail {
    pub fn contains(&self, number: HadithNumber) -> bool {
        number >= self.hadithnumber_first && number <= self.hadithnumber_last
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Hadith {
    pub hadithnumber: HadithNumber,
    #[serde(default)]
    pub arabicnumber: HadithNumber,
    pub text: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub grades: Vec<Grade>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<Reference>,
}

impl Hadith {
    /// The first grade given, if any.
    pub fn primary_grade(&self) -> Option<&str> {
        self.grades.first().map(|g| g.grade.as_str())
    }
}

/// Authenticity grade assigned by a named scholar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Grade {
    pub name: String,
    pub grade: String,
}

/// Cross-reference into the printed book.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct Reference {
    pub book: HadithNumber,
    pub hadith: HadithNumber,
}

/// Whether a combined entry's translation came from the translation set or
/// is the original-language entry standing in for a missing translation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "lowercase")]
pub enum TranslationSource {
    #[default]
    Translation,
    Fallback,
}

/// Original-language hadith paired with its translation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct CombinedHadith {
    pub arabic: Hadith,
    pub translation: Hadith,
    #[serde(default)]
    pub translation_source: TranslationSource,
}

impl CombinedHadith {
    pub fn number(&self) -> HadithNumber {
        self.arabic.hadithnumber
    }

    pub fn is_fallback(&self) -> bool {
        self.translation_source == TranslationSource::Fallback
    }
}

/// Summary numbers shown on a book page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct BookStats {
    pub total_hadiths: usize,
    pub total_sections: usize,
    pub available_languages: Vec<String>,
}
