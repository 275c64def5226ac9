//! Command handlers.

use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use tracing::{debug, info, warn};

use hadithnet_core::api::{ApiClient, FetchFailure, HadithService};
use hadithnet_core::auth::{hash_password, AdminCredentials, AdminSession};
use hadithnet_core::cache::{CacheKey, CacheManager};
use hadithnet_core::config::Config;
use hadithnet_core::models::{language_info, HadithNumber, UpdateTranslationRequest};
use hadithnet_core::state::{AppState, Bookmark, Theme};
use hadithnet_core::storage::{FileStorage, KeyValueStorage, MemoryStorage};

use crate::args::{
    AdminCommand, BookmarkCommand, CacheCommand, Command, SettingsCommand, ThemeChoice, USAGE,
};
use crate::output;

/// Replace a fetch error with the message a reader should see, keeping the
/// cause in the debug log.
fn present(err: anyhow::Error) -> anyhow::Error {
    let failure = FetchFailure::classify(&err);
    debug!(error = %format!("{:#}", err), ?failure, "Fetch failed");
    anyhow!(failure.user_message())
}

fn parse_number(raw: &str) -> Result<HadithNumber> {
    let value: f64 = raw
        .parse()
        .with_context(|| format!("Invalid hadith number: {}", raw))?;
    if !value.is_finite() || value <= 0.0 {
        bail!("Invalid hadith number: {}", raw);
    }
    Ok(HadithNumber(value))
}

/// Write `contents` to `file`, or stdout when no file is given.
fn write_out(file: Option<&str>, contents: &str) -> Result<()> {
    match file {
        Some(path) => {
            std::fs::write(path, contents).with_context(|| format!("Failed to write {}", path))?;
            eprintln!("Wrote {}", path);
        }
        None => println!("{}", contents),
    }
    Ok(())
}

pub struct Reader {
    config: Config,
    service: HadithService,
    state: AppState,
    session: AdminSession,
}

impl Reader {
    pub fn open(config: Config) -> Result<Self> {
        let storage = open_storage(&config);
        let cache = Arc::new(CacheManager::new(Arc::clone(&storage)));
        let api = ApiClient::new(config.api_base_url.clone())?;

        Ok(Self {
            service: HadithService::new(api, cache),
            state: AppState::load(Arc::clone(&storage)),
            session: AdminSession::new(storage),
            config,
        })
    }

    /// Requested language, or the one saved in settings.
    fn language(&self, lang: Option<String>) -> String {
        lang.unwrap_or_else(|| self.state.settings().language.clone())
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::Help => println!("{}", USAGE),
            Command::Editions => self.editions().await?,
            Command::Read { book, lang } => {
                let lang = self.language(lang);
                self.read(&book, &lang).await?
            }
            Command::Section {
                book,
                section,
                lang,
            } => {
                let lang = self.language(lang);
                self.section(&book, &section, &lang).await?
            }
            Command::Search { query, book, lang } => {
                let lang = self.language(lang);
                self.search(&query, book.as_deref(), &lang).await?
            }
            Command::Stats { book } => {
                let stats = self.service.get_book_stats(&book).await;
                output::stats(&book, &stats);
            }
            Command::Bookmarks(cmd) => self.bookmarks(cmd).await?,
            Command::Settings(cmd) => self.settings(cmd)?,
            Command::Cache(cmd) => self.cache(cmd),
            Command::Admin(cmd) => self.admin(cmd).await?,
        }
        Ok(())
    }

    // ===== Reading =====

    async fn editions(&mut self) -> Result<()> {
        let editions = self.service.get_editions().await.map_err(present)?;
        output::editions(&editions);
        if let Err(e) = self.state.update_settings(|s| s.touch_last_sync()) {
            warn!(error = %e, "Failed to record sync time");
        }
        Ok(())
    }

    async fn read(&self, book: &str, lang: &str) -> Result<()> {
        let data = self
            .service
            .get_hadith_data(book, lang)
            .await
            .map_err(present)?;
        let stats = self.service.get_book_stats(book).await;
        output::book_overview(&data, &stats);
        Ok(())
    }

    async fn section(&self, book: &str, section: &str, lang: &str) -> Result<()> {
        let hadiths = self
            .service
            .get_combined_hadith(book, section, lang)
            .await
            .map_err(present)?;
        if hadiths.is_empty() {
            println!("No hadiths in section {}", section);
            return Ok(());
        }
        for hadith in &hadiths {
            output::combined(hadith, self.state.settings());
        }
        let fallbacks = hadiths.iter().filter(|h| h.is_fallback()).count();
        if fallbacks > 0 {
            eprintln!("{} hadiths have no {} translation", fallbacks, lang);
        }
        Ok(())
    }

    async fn search(&self, query: &str, book: Option<&str>, lang: &str) -> Result<()> {
        let results = self
            .service
            .search_hadiths(query, book, lang)
            .await
            .map_err(present)?;
        for hadith in &results {
            output::search_result(book, hadith);
        }
        println!("\n{} results", results.len());
        Ok(())
    }

    // ===== Bookmarks =====

    async fn bookmarks(&mut self, cmd: BookmarkCommand) -> Result<()> {
        match cmd {
            BookmarkCommand::List { book } => {
                let bookmarks = self.state.bookmarks();
                let items: Vec<&Bookmark> = match book.as_deref() {
                    Some(book) => bookmarks.by_book(book),
                    None => bookmarks.iter().collect(),
                };
                for bookmark in &items {
                    output::bookmark(bookmark);
                }
                println!("\n{} bookmarks", items.len());
            }
            BookmarkCommand::Add {
                book,
                section,
                number,
                lang,
                note,
            } => {
                let lang = self.language(lang);
                let bookmark = self
                    .build_bookmark(&book, &section, parse_number(&number)?, &lang)
                    .await?;
                let id = bookmark.id.clone();
                if !self.state.add_bookmark(bookmark)? {
                    println!("Already bookmarked: {}", id);
                    return Ok(());
                }
                if let Some(note) = note {
                    self.state.update_bookmark_notes(&id, &note)?;
                }
                println!("Bookmarked {}", id);
            }
            BookmarkCommand::Remove { id } => {
                if self.state.remove_bookmark(&id)? {
                    println!("Removed {}", id);
                } else {
                    bail!("No bookmark {}", id);
                }
            }
            BookmarkCommand::Note { id, text } => {
                if !self.state.update_bookmark_notes(&id, &text)? {
                    bail!("No bookmark {}", id);
                }
            }
            BookmarkCommand::Tag { id, tags } => {
                if !self.state.update_bookmark_tags(&id, tags)? {
                    bail!("No bookmark {}", id);
                }
            }
            BookmarkCommand::Search { query } => {
                let found = self.state.bookmarks().search(&query);
                for bookmark in &found {
                    output::bookmark(bookmark);
                }
                println!("\n{} bookmarks", found.len());
            }
            BookmarkCommand::Export { file } => {
                write_out(file.as_deref(), &self.state.bookmarks().export()?)?;
            }
            BookmarkCommand::Import { file } => {
                let json = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file))?;
                let added = self.state.import_bookmarks(&json)?;
                println!("Imported {} bookmarks", added);
            }
            BookmarkCommand::Clear => {
                let count = self.state.bookmarks().len();
                self.state.clear_bookmarks()?;
                println!("Removed {} bookmarks", count);
            }
        }
        Ok(())
    }

    async fn build_bookmark(
        &self,
        book: &str,
        section: &str,
        number: HadithNumber,
        lang: &str,
    ) -> Result<Bookmark> {
        let hadiths = self
            .service
            .get_combined_hadith(book, section, lang)
            .await
            .map_err(present)?;
        let hadith = hadiths
            .iter()
            .find(|h| h.number() == number)
            .with_context(|| format!("Hadith {} is not in section {}", number, section))?;

        // Names are best effort; the bookmark is still useful without them.
        let book_name = match self.service.get_editions().await {
            Ok(editions) => editions
                .get(book)
                .map(|e| e.name.clone())
                .unwrap_or_else(|| book.to_string()),
            Err(_) => book.to_string(),
        };
        let section_name = match self.service.get_hadith_data(book, lang).await {
            Ok(data) => data.metadata.sections.get(section).cloned(),
            Err(_) => None,
        };

        Ok(Bookmark::from_combined(
            hadith,
            book,
            &book_name,
            section_name.as_deref().map(|name| (section, name)),
        ))
    }

    // ===== Settings =====

    fn settings(&mut self, cmd: SettingsCommand) -> Result<()> {
        match cmd {
            SettingsCommand::Show => {}
            SettingsCommand::Theme(choice) => match choice {
                ThemeChoice::Toggle => self.state.update_settings(|s| s.toggle_theme())?,
                ThemeChoice::Colors => self.state.update_settings(|s| s.cycle_color_themes())?,
                ThemeChoice::Named(name) => {
                    let theme: Theme = name.parse().map_err(|e: String| {
                        let names: Vec<&str> = Theme::ALL.iter().map(Theme::as_str).collect();
                        anyhow!("{} (expected one of: {})", e, names.join(", "))
                    })?;
                    self.state.update_settings(|s| s.theme = theme)?
                }
            },
            SettingsCommand::Font { larger, arabic } => {
                self.state.update_settings(|s| match (larger, arabic) {
                    (true, false) => s.increase_font_size(),
                    (false, false) => s.decrease_font_size(),
                    (true, true) => s.increase_arabic_font_size(),
                    (false, true) => s.decrease_arabic_font_size(),
                })?
            }
            SettingsCommand::Language(code) => {
                if language_info(&code).is_none() {
                    warn!(code = %code, "Unknown language code");
                    eprintln!("Warning: {} is not a known language code", code);
                }
                self.state.update_settings(|s| s.language = code)?
            }
            SettingsCommand::Reset => self.state.update_settings(|s| s.reset())?,
            SettingsCommand::Export { file } => {
                return write_out(file.as_deref(), &self.state.settings().export()?);
            }
            SettingsCommand::Import { file } => {
                let json = std::fs::read_to_string(&file)
                    .with_context(|| format!("Failed to read {}", file))?;
                self.state.import_settings(&json)?;
            }
        }
        output::settings(self.state.settings());
        Ok(())
    }

    // ===== Cache =====

    fn cache(&self, cmd: CacheCommand) {
        let cache = self.service.cache();
        match cmd {
            CacheCommand::Stats => {}
            CacheCommand::Prune => {
                let expired = cache.clear_expired();
                let evicted = cache.ensure_cache_size();
                println!("Removed {} expired and {} least-used entries", expired, evicted);
            }
            CacheCommand::Clear => {
                let removed = cache.clear_all();
                println!("Removed {} entries", removed);
            }
        }
        output::cache(&cache.stats(), &cache.storage_info());
    }

    // ===== Admin =====

    async fn admin(&self, cmd: AdminCommand) -> Result<()> {
        match cmd {
            AdminCommand::Login { username } => {
                let username = username.unwrap_or_else(|| self.config.admin_username.clone());
                let password = rpassword::prompt_password("Password: ")
                    .context("Failed to read password")?;
                let credentials = AdminCredentials {
                    username: self.config.admin_username.clone(),
                    password_hash: self.config.admin_password_hash.clone(),
                };
                let session = self.session.login(&username, &password, &credentials)?;
                println!(
                    "Logged in as {} ({} minutes remaining)",
                    username,
                    session.minutes_until_expiry()
                );
            }
            AdminCommand::Logout => {
                self.session.logout()?;
                println!("Logged out");
            }
            AdminCommand::Status => {
                match self.session.current() {
                    Some(session) => println!(
                        "Logged in, session expires in {} minutes",
                        session.minutes_until_expiry()
                    ),
                    None => println!("Not logged in"),
                }
                match self.service.api().admin_status().await {
                    Ok(status) => println!(
                        "Server: {} (content repository {})",
                        status.status,
                        if status.github_configured {
                            "configured"
                        } else {
                            "not configured"
                        }
                    ),
                    Err(e) => println!("Server unreachable: {}", e),
                }
            }
            AdminCommand::HashPassword => {
                let password = rpassword::prompt_password("New password: ")
                    .context("Failed to read password")?;
                let confirm = rpassword::prompt_password("Confirm password: ")
                    .context("Failed to read password")?;
                if password != confirm {
                    bail!("Passwords do not match");
                }
                println!("{}", hash_password(&password)?);
                eprintln!("Set this as admin_password_hash in the config file or HADITHNET_ADMIN_PASSWORD_HASH.");
            }
            AdminCommand::Update {
                book,
                language,
                number,
                text,
            } => {
                if !self.session.is_authenticated() {
                    bail!("Not logged in. Run `hadithnet admin login` first.");
                }
                let request = UpdateTranslationRequest {
                    book,
                    language,
                    hadith_number: Some(parse_number(&number)?),
                    text,
                };
                let response = self.service.api().update_translation(&request).await?;

                // The cached book is stale now.
                let key = CacheKey::hadith(&request.book, &request.language);
                self.service.cache().remove(&key.to_storage_key());

                info!(commit = %response.commit, "Translation updated");
                println!("{} (commit {})", response.message, response.commit);
            }
        }
        Ok(())
    }
}

/// The persistent storage area, or an in-memory one when the data
/// directory cannot be used.
fn open_storage(config: &Config) -> Arc<dyn KeyValueStorage> {
    let opened = config
        .storage_dir()
        .and_then(|dir| FileStorage::new(dir).map_err(anyhow::Error::from));
    match opened {
        Ok(storage) => Arc::new(storage),
        Err(e) => {
            warn!(error = %e, "Persistent storage unavailable, using memory");
            Arc::new(MemoryStorage::new())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hadithnet_core::api::ApiError;

    #[test]
    fn test_parse_number() {
        assert_eq!(parse_number("12").unwrap(), HadithNumber::from(12));
        assert_eq!(parse_number("7.1").unwrap(), HadithNumber(7.1));
        assert!(parse_number("0").is_err());
        assert!(parse_number("abc").is_err());
        assert!(parse_number("NaN").is_err());
        assert!(parse_number("inf").is_err());
    }

    #[test]
    fn test_present_messages() {
        let not_found = anyhow::Error::new(ApiError::NotFound("missing".into()))
            .context("Failed to fetch hadith");
        assert_eq!(present(not_found).to_string(), "Not available in this language");

        let other = anyhow!("connection refused");
        assert_eq!(
            present(other).to_string(),
            "Something went wrong, please try again"
        );
    }
}
