//! Payloads of the admin translation-update endpoint.

use serde::{Deserialize, Serialize};

use super::HadithNumber;

/// Body of `POST /api/admin/update-translation`.
///
/// Every field defaults so a partial body still deserializes and the
/// handler can answer with a field-level 400 instead of a parse error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateTranslationRequest {
    pub book: String,
    pub language: String,
    pub hadith_number: Option<HadithNumber>,
    pub text: String,
}

impl UpdateTranslationRequest {
    /// Names of required fields that are missing or blank.
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.book.trim().is_empty() {
            missing.push("book");
        }
        if self.language.trim().is_empty() {
            missing.push("language");
        }
        if self.hadith_number.map_or(true, |n| n.value() == 0.0) {
            missing.push("hadithNumber");
        }
        if self.text.trim().is_empty() {
            missing.push("text");
        }
        missing
    }

    pub fn commit_message(&self) -> String {
        format!(
            "Update {} translation for {} hadith #{}",
            self.language,
            self.book,
            self.hadith_number.unwrap_or_default()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
pub struct UpdateTranslationResponse {
    pub success: bool,
    pub message: String,
    /// Sha of the commit that carried the edit.
    pub commit: String,
}

/// Answer of `GET /api/admin/update-translation`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "ts", derive(ts_rs::TS), ts(export))]
#[serde(rename_all = "camelCase")]
pub struct AdminEndpointStatus {
    pub status: String,
    pub github_configured: bool,
}
