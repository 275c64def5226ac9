use chrono::{DateTime, Utc};

use crate::models::HadithNumber;

/// Zero-pad a hadith number to four digits, e.g. `7` -> `0007`.
///
/// Fractional numbers keep their decimal part: `7.1` -> `0007.1`.
pub fn format_hadith_number(number: HadithNumber) -> String {
    let text = number.to_string();
    let (int_part, rest) = match text.find('.') {
        Some(dot) => text.split_at(dot),
        None => (text.as_str(), ""),
    };
    format!("{:0>4}{}", int_part, rest)
}

/// Strip the leading `Sunan`/`Sahih`/`Jami` word from a collection name.
pub fn extract_book_name(full_name: &str) -> &str {
    let trimmed = full_name.trim();
    for prefix in ["Sunan", "Sahih", "Jami"] {
        if let Some(rest) = trimmed.strip_prefix(prefix) {
            if rest.starts_with(char::is_whitespace) {
                return rest.trim();
            }
        }
    }
    trimmed
}

/// True when the text contains Arabic-script characters.
pub fn is_rtl(text: &str) -> bool {
    text.chars().any(|c| {
        matches!(c,
            '\u{0600}'..='\u{06FF}' | '\u{0750}'..='\u{077F}' | '\u{08A0}'..='\u{08FF}')
    })
}

/// Truncate a string to a maximum length, adding ellipsis if needed
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Broad authenticity class of a grade label.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GradeClass {
    Sahih,
    Hasan,
    Daif,
    Other,
}

impl GradeClass {
    pub fn label(&self) -> &'static str {
        match self {
            GradeClass::Sahih => "sahih",
            GradeClass::Hasan => "hasan",
            GradeClass::Daif => "daif",
            GradeClass::Other => "other",
        }
    }
}

pub fn classify_grade(grade: &str) -> GradeClass {
    let lower = grade.to_lowercase();
    if lower.contains("sahih") {
        GradeClass::Sahih
    } else if lower.contains("hasan") {
        GradeClass::Hasan
    } else if lower.contains("daif") || lower.contains("weak") {
        GradeClass::Daif
    } else {
        GradeClass::Other
    }
}

/// Coarse time since `then`, rounded to the nearest minute, hour or day.
pub fn relative_age(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes();
    match minutes {
        // Negative covers clock skew
        m if m < 1 => "just now".to_string(),
        m if m < 60 => format!("{}m ago", m),
        m if m < 24 * 60 => format!("{}h ago", (m + 30) / 60),
        m => format!("{}d ago", (m + 12 * 60) / (24 * 60)),
    }
}
