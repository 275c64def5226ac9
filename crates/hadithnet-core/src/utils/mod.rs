//! Utility functions for formatting hadith text and metadata.

pub mod format;

pub use format::{
    classify_grade, extract_book_name, format_hadith_number, is_rtl, relative_age, truncate_string,
    GradeClass,
};
