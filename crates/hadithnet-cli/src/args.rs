//! Command-line parsing.

use anyhow::{bail, Context, Result};

pub const USAGE: &str = "\
Usage: hadithnet <COMMAND>

Reading:
  editions                                  List hadith collections
  read <book> [--lang L]                    Book overview and sections
  section <book> <section> [--lang L]       Read a section with translation
  search <query> [--book B] [--lang L]      Search translation text
  stats <book>                              Book statistics

Bookmarks:
  bookmarks list [--book B]
  bookmarks add <book> <section> <number> [--lang L] [--note TEXT]
  bookmarks remove <id>
  bookmarks note <id> <text>
  bookmarks tag <id> <tag,tag,...>
  bookmarks search <query>
  bookmarks export [file]
  bookmarks import <file>
  bookmarks clear

Settings:
  settings show
  settings theme [toggle|colors|<name>]
  settings font <larger|smaller> [--arabic]
  settings language <code>
  settings reset
  settings export [file]
  settings import <file>

Cache:
  cache stats | cache prune | cache clear

Admin:
  admin login [username] | admin logout | admin status
  admin hash-password
  admin update <book> <language> <number> <text>";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Editions,
    Read { book: String, lang: Option<String> },
    Section { book: String, section: String, lang: Option<String> },
    Search { query: String, book: Option<String>, lang: Option<String> },
    Stats { book: String },
    Bookmarks(BookmarkCommand),
    Settings(SettingsCommand),
    Cache(CacheCommand),
    Admin(AdminCommand),
    Help,
}

#[derive(Debug, Clone, PartialEq)]
pub enum BookmarkCommand {
    List { book: Option<String> },
    Add {
        book: String,
        section: String,
        number: String,
        lang: Option<String>,
        note: Option<String>,
    },
    Remove { id: String },
    Note { id: String, text: String },
    Tag { id: String, tags: Vec<String> },
    Search { query: String },
    Export { file: Option<String> },
    Import { file: String },
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ThemeChoice {
    Toggle,
    Colors,
    Named(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum SettingsCommand {
    Show,
    Theme(ThemeChoice),
    Font { larger: bool, arabic: bool },
    Language(String),
    Reset,
    Export { file: Option<String> },
    Import { file: String },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CacheCommand {
    Stats,
    Prune,
    Clear,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    Login { username: Option<String> },
    Logout,
    Status,
    HashPassword,
    Update {
        book: String,
        language: String,
        number: String,
        text: String,
    },
}

/// Positional arguments plus `--flag value` options.
struct Parsed {
    positional: Vec<String>,
    options: Vec<(String, Option<String>)>,
}

impl Parsed {
    /// Flags that take no value.
    const SWITCHES: &'static [&'static str] = &["--arabic"];

    fn new(args: &[String]) -> Result<Self> {
        let mut positional = Vec::new();
        let mut options = Vec::new();
        let mut iter = args.iter();
        while let Some(arg) = iter.next() {
            if let Some(name) = arg.strip_prefix("--") {
                if Self::SWITCHES.contains(&arg.as_str()) {
                    options.push((name.to_string(), None));
                } else {
                    let value = iter
                        .next()
                        .with_context(|| format!("{} requires a value", arg))?;
                    options.push((name.to_string(), Some(value.clone())));
                }
            } else {
                positional.push(arg.clone());
            }
        }
        Ok(Self {
            positional,
            options,
        })
    }

    fn option(&self, name: &str) -> Option<String> {
        self.options
            .iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.clone())
    }

    fn switch(&self, name: &str) -> bool {
        self.options.iter().any(|(n, _)| n == name)
    }

    fn arg(&self, index: usize, what: &str) -> Result<String> {
        self.positional
            .get(index)
            .cloned()
            .with_context(|| format!("Missing {}\n\n{}", what, USAGE))
    }

    fn opt_arg(&self, index: usize) -> Option<String> {
        self.positional.get(index).cloned()
    }

    /// Positionals from `index` on, joined with spaces.
    fn rest(&self, index: usize, what: &str) -> Result<String> {
        let rest = self.positional.get(index..).unwrap_or_default().join(" ");
        if rest.is_empty() {
            bail!("Missing {}\n\n{}", what, USAGE);
        }
        Ok(rest)
    }
}

pub fn parse(args: &[String]) -> Result<Command> {
    let Some((command, rest)) = args.split_first() else {
        return Ok(Command::Help);
    };
    let p = Parsed::new(rest)?;

    let command = match command.as_str() {
        "editions" => Command::Editions,
        "read" => Command::Read {
            book: p.arg(0, "book")?,
            lang: p.option("lang"),
        },
        "section" => Command::Section {
            book: p.arg(0, "book")?,
            section: p.arg(1, "section")?,
            lang: p.option("lang"),
        },
        "search" => Command::Search {
            query: p.rest(0, "search query")?,
            book: p.option("book"),
            lang: p.option("lang"),
        },
        "stats" => Command::Stats {
            book: p.arg(0, "book")?,
        },
        "bookmarks" => Command::Bookmarks(parse_bookmarks(&p)?),
        "settings" => Command::Settings(parse_settings(&p)?),
        "cache" => Command::Cache(match p.opt_arg(0).as_deref() {
            None | Some("stats") => CacheCommand::Stats,
            Some("prune") => CacheCommand::Prune,
            Some("clear") => CacheCommand::Clear,
            Some(other) => bail!("Unknown cache command: {}\n\n{}", other, USAGE),
        }),
        "admin" => Command::Admin(parse_admin(&p)?),
        "help" | "-h" | "--help" => Command::Help,
        other => bail!("Unknown command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

fn parse_bookmarks(p: &Parsed) -> Result<BookmarkCommand> {
    let command = match p.opt_arg(0).as_deref() {
        None | Some("list") => BookmarkCommand::List {
            book: p.option("book"),
        },
        Some("add") => BookmarkCommand::Add {
            book: p.arg(1, "book")?,
            section: p.arg(2, "section")?,
            number: p.arg(3, "hadith number")?,
            lang: p.option("lang"),
            note: p.option("note"),
        },
        Some("remove") => BookmarkCommand::Remove {
            id: p.arg(1, "bookmark id")?,
        },
        Some("note") => BookmarkCommand::Note {
            id: p.arg(1, "bookmark id")?,
            text: p.rest(2, "note text")?,
        },
        Some("tag") => BookmarkCommand::Tag {
            id: p.arg(1, "bookmark id")?,
            tags: p
                .arg(2, "tags")?
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect(),
        },
        Some("search") => BookmarkCommand::Search {
            query: p.rest(1, "search query")?,
        },
        Some("export") => BookmarkCommand::Export { file: p.opt_arg(1) },
        Some("import") => BookmarkCommand::Import {
            file: p.arg(1, "file")?,
        },
        Some("clear") => BookmarkCommand::Clear,
        Some(other) => bail!("Unknown bookmarks command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

fn parse_settings(p: &Parsed) -> Result<SettingsCommand> {
    let command = match p.opt_arg(0).as_deref() {
        None | Some("show") => SettingsCommand::Show,
        Some("theme") => SettingsCommand::Theme(match p.opt_arg(1).as_deref() {
            None | Some("toggle") => ThemeChoice::Toggle,
            Some("colors") => ThemeChoice::Colors,
            Some(name) => ThemeChoice::Named(name.to_string()),
        }),
        Some("font") => SettingsCommand::Font {
            larger: match p.arg(1, "larger or smaller")?.as_str() {
                "larger" => true,
                "smaller" => false,
                other => bail!("Expected larger or smaller, got {}", other),
            },
            arabic: p.switch("arabic"),
        },
        Some("language") => SettingsCommand::Language(p.arg(1, "language code")?),
        Some("reset") => SettingsCommand::Reset,
        Some("export") => SettingsCommand::Export { file: p.opt_arg(1) },
        Some("import") => SettingsCommand::Import {
            file: p.arg(1, "file")?,
        },
        Some(other) => bail!("Unknown settings command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

fn parse_admin(p: &Parsed) -> Result<AdminCommand> {
    let command = match p.opt_arg(0).as_deref() {
        Some("login") => AdminCommand::Login {
            username: p.opt_arg(1),
        },
        Some("logout") => AdminCommand::Logout,
        None | Some("status") => AdminCommand::Status,
        Some("hash-password") => AdminCommand::HashPassword,
        Some("update") => AdminCommand::Update {
            book: p.arg(1, "book")?,
            language: p.arg(2, "language")?,
            number: p.arg(3, "hadith number")?,
            text: p.rest(4, "text")?,
        },
        Some(other) => bail!("Unknown admin command: {}\n\n{}", other, USAGE),
    };
    Ok(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse_str(line: &str) -> Result<Command> {
        let args: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        parse(&args)
    }

    #[test]
    fn test_no_args_is_help() {
        assert_eq!(parse(&[]).unwrap(), Command::Help);
    }

    #[test]
    fn test_section_with_lang() {
        assert_eq!(
            parse_str("section bukhari 1 --lang urd").unwrap(),
            Command::Section {
                book: "bukhari".into(),
                section: "1".into(),
                lang: Some("urd".into()),
            }
        );
    }

    #[test]
    fn test_search_joins_words() {
        assert_eq!(
            parse_str("search actions are by intentions --book bukhari").unwrap(),
            Command::Search {
                query: "actions are by intentions".into(),
                book: Some("bukhari".into()),
                lang: None,
            }
        );
    }

    #[test]
    fn test_bookmark_commands() {
        assert_eq!(
            parse_str("bookmarks").unwrap(),
            Command::Bookmarks(BookmarkCommand::List { book: None })
        );
        assert_eq!(
            parse_str("bookmarks tag bukhari-1 faith,,intention").unwrap(),
            Command::Bookmarks(BookmarkCommand::Tag {
                id: "bukhari-1".into(),
                tags: vec!["faith".into(), "intention".into()],
            })
        );
        assert_eq!(
            parse_str("bookmarks note bukhari-1 read again").unwrap(),
            Command::Bookmarks(BookmarkCommand::Note {
                id: "bukhari-1".into(),
                text: "read again".into(),
            })
        );
    }

    #[test]
    fn test_settings_font_switch() {
        assert_eq!(
            parse_str("settings font larger --arabic").unwrap(),
            Command::Settings(SettingsCommand::Font {
                larger: true,
                arabic: true,
            })
        );
        assert!(parse_str("settings font huge").is_err());
    }

    #[test]
    fn test_errors() {
        assert!(parse_str("unknown").is_err());
        assert!(parse_str("read").is_err());
        assert!(parse_str("read bukhari --lang").is_err());
        assert!(parse_str("cache shrink").is_err());
    }
}
