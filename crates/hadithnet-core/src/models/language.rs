//! Language codes used by the dataset.

/// Language of the original hadith text.
pub const ORIGINAL_LANGUAGE: &str = "ara";

/// Display information for a language code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageInfo {
    pub code: &'static str,
    pub name: &'static str,
    pub native_name: &'static str,
}

const LANGUAGES: &[LanguageInfo] = &[
    LanguageInfo { code: "ara", name: "Arabic", native_name: "العربية" },
    LanguageInfo { code: "eng", name: "English", native_name: "English" },
    LanguageInfo { code: "urd", name: "Urdu", native_name: "اردو" },
    LanguageInfo { code: "tam", name: "Tamil", native_name: "தமிழ்" },
    LanguageInfo { code: "tur", name: "Turkish", native_name: "Türkçe" },
    LanguageInfo { code: "ind", name: "Indonesian", native_name: "Bahasa Indonesia" },
    LanguageInfo { code: "fra", name: "French", native_name: "Français" },
    LanguageInfo { code: "rus", name: "Russian", native_name: "Русский" },
    LanguageInfo { code: "ben", name: "Bengali", native_name: "বাংলা" },
    LanguageInfo { code: "spa", name: "Spanish", native_name: "Español" },
    LanguageInfo { code: "chi", name: "Chinese", native_name: "中文" },
    LanguageInfo { code: "ger", name: "German", native_name: "Deutsch" },
    LanguageInfo { code: "ita", name: "Italian", native_name: "Italiano" },
    LanguageInfo { code: "mal", name: "Malayalam", native_name: "മലയാളം" },
];

/// Look up display names for a language code.
pub fn language_info(code: &str) -> Option<&'static LanguageInfo> {
    LANGUAGES.iter().find(|l| l.code == code)
}

/// Extract the language code from a collection name such as `eng-bukhari`.
/// Returns `"unknown"` when the name has no three-letter lowercase prefix.
pub fn extract_language_code(collection_name: &str) -> &str {
    match collection_name.split_once('-') {
        Some((prefix, _))
            if prefix.len() == 3 && prefix.chars().all(|c| c.is_ascii_lowercase()) =>
        {
            prefix
        }
        _ => "unknown",
    }
}
