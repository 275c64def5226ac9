//! Plain-text rendering for the terminal.

use chrono::{DateTime, Local, Utc};

use hadithnet_core::cache::{CacheStats, StorageInfo};
use hadithnet_core::models::{language_info, BookStats, CombinedHadith, Editions, HadithBook};
use hadithnet_core::state::{Bookmark, Settings};
use hadithnet_core::utils::{
    classify_grade, extract_book_name, format_hadith_number, is_rtl, relative_age,
    truncate_string, GradeClass,
};

/// Width of text previews in lists.
const PREVIEW_CHARS: usize = 160;

fn language_label(code: &str) -> String {
    match language_info(code) {
        Some(info) => format!("{} ({})", info.name, code),
        None => code.to_string(),
    }
}

fn local_time(time: DateTime<Utc>) -> String {
    time.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string()
}

fn format_bytes(bytes: usize) -> String {
    if bytes >= 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else if bytes >= 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{} B", bytes)
    }
}

pub fn editions(editions: &Editions) {
    for (id, edition) in &editions.0 {
        println!("{:<12} {}", id, extract_book_name(&edition.name));
        println!("{:<12} {}", "", edition.languages().join(", "));
    }
    println!("\n{} collections", editions.len());
}

pub fn book_overview(book: &HadithBook, stats: &BookStats) {
    println!("{}", book.metadata.name);
    println!(
        "{} hadiths in {} sections",
        stats.total_hadiths, stats.total_sections
    );
    if !stats.available_languages.is_empty() {
        println!("Languages: {}", stats.available_languages.join(", "));
    }
    println!();
    for id in book.section_ids() {
        let name = book
            .metadata
            .sections
            .get(id)
            .map(String::as_str)
            .unwrap_or_default();
        let range = book
            .metadata
            .section_details
            .get(id)
            .map(|d| format!("{}-{}", d.hadithnumber_first, d.hadithnumber_last))
            .unwrap_or_default();
        println!("{:>4}  {:<60} {}", id, truncate_string(name, 60), range);
    }
}

pub fn stats(book: &str, stats: &BookStats) {
    println!("{}", book);
    println!("  Hadiths:   {}", stats.total_hadiths);
    println!("  Sections:  {}", stats.total_sections);
    println!("  Languages: {}", stats.available_languages.join(", "));
}

fn grade_marker(grade: &str) -> &'static str {
    match classify_grade(grade) {
        GradeClass::Sahih => "+",
        GradeClass::Hasan => "~",
        GradeClass::Daif => "!",
        GradeClass::Other => " ",
    }
}

pub fn combined(hadith: &CombinedHadith, settings: &Settings) {
    println!("--- #{} ---", format_hadith_number(hadith.number()));
    println!("{}", hadith.arabic.text);
    if hadith.is_fallback() {
        println!("(translation not available)");
    } else {
        let text = &hadith.translation.text;
        // Right-to-left translations are printed with a direction mark.
        if is_rtl(text) {
            println!("\u{200F}{}", text);
        } else {
            println!("{}", text);
        }
    }
    if settings.show_grades {
        for grade in &hadith.translation.grades {
            println!(
                "  [{}] {} ({})",
                grade_marker(&grade.grade),
                grade.grade,
                grade.name
            );
        }
    }
    if settings.show_references {
        if let Some(reference) = hadith.translation.reference {
            println!("  Book {}, Hadith {}", reference.book, reference.hadith);
        }
    }
    println!();
}

pub fn search_result(book: Option<&str>, hadith: &CombinedHadith) {
    let prefix = book.map(|b| format!("{} ", b)).unwrap_or_default();
    println!(
        "{}#{}: {}",
        prefix,
        format_hadith_number(hadith.number()),
        truncate_string(&hadith.translation.text, PREVIEW_CHARS)
    );
}

pub fn bookmark(bookmark: &Bookmark) {
    let section = bookmark
        .section_name
        .as_deref()
        .map(|s| format!(" / {}", s))
        .unwrap_or_default();
    println!(
        "{}  {}{}  ({})",
        bookmark.id,
        extract_book_name(&bookmark.book_name),
        section,
        local_time(bookmark.date_added)
    );
    println!("    {}", truncate_string(&bookmark.hadith_text, PREVIEW_CHARS));
    if !bookmark.notes.is_empty() {
        println!("    Note: {}", bookmark.notes);
    }
    if !bookmark.tags.is_empty() {
        println!("    Tags: {}", bookmark.tags.join(", "));
    }
}

pub fn settings(settings: &Settings) {
    let yes_no = |b: bool| if b { "on" } else { "off" };
    println!("Theme:              {}", settings.theme);
    println!("Language:           {}", language_label(&settings.language));
    println!("Font size:          {}", settings.font_size.as_str());
    println!("Arabic font size:   {}", settings.arabic_font_size.as_str());
    println!("Show grades:        {}", yes_no(settings.show_grades));
    println!("Show references:    {}", yes_no(settings.show_references));
    println!("Arabic numbers:     {}", yes_no(settings.show_arabic_numbers));
    println!("Auto-scroll:        {}", yes_no(settings.auto_scroll_to_next));
    println!("High contrast:      {}", yes_no(settings.high_contrast));
    println!("Reduced motion:     {}", yes_no(settings.reduced_motion));
    println!("Compact mode:       {}", yes_no(settings.compact_mode));
    println!("Show bookmarks:     {}", yes_no(settings.show_bookmarks));
    println!("Notifications:      {}", yes_no(settings.enable_notifications));
    let synced = DateTime::<Utc>::from_timestamp_millis(settings.last_sync_time)
        .filter(|_| settings.last_sync_time > 0)
        .map(local_time)
        .unwrap_or_else(|| "never".to_string());
    println!("Last sync:          {}", synced);
}

pub fn cache(stats: &CacheStats, info: &StorageInfo) {
    println!("Cached items:   {}", stats.total_items);
    println!("Cache size:     {}", format_bytes(stats.total_size));
    let now = Utc::now();
    if let Some(oldest) = stats.oldest_item {
        println!("Oldest entry:   {} ({})", local_time(oldest), relative_age(oldest, now));
    }
    if let Some(newest) = stats.newest_item {
        println!("Newest entry:   {} ({})", local_time(newest), relative_age(newest, now));
    }
    println!(
        "Storage used:   {} ({:.1}%), {} available",
        format_bytes(info.used),
        info.percentage,
        format_bytes(info.available)
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_bytes() {
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(2048), "2.0 KB");
        assert_eq!(format_bytes(5 * 1024 * 1024), "5.0 MB");
    }

    #[test]
    fn test_language_label() {
        assert_eq!(language_label("eng"), "English (eng)");
        assert_eq!(language_label("xyz"), "xyz");
    }

    #[test]
    fn test_grade_marker() {
        assert_eq!(grade_marker("Sahih"), "+");
        assert_eq!(grade_marker("Da'if"), " ");
        assert_eq!(grade_marker("Daif"), "!");
    }
}
