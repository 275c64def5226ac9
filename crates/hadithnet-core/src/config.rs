//! Application configuration management.
//!
//! Configuration is stored at `~/.config/hadithnet/config.json`. Every
//! field has a default, and environment variables (usually from `.env`)
//! override the file so deployments can inject secrets without writing
//! them to disk.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Application name used for config/data directory paths
pub const APP_NAME: &str = "hadithnet";

/// Config file name
const CONFIG_FILE: &str = "config.json";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:3000";
pub const DEFAULT_CDN_BASE_URL: &str = "https://cdn.jsdelivr.net/gh/adhilansari/hadithDb";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";
pub const DEFAULT_CACHE_VERSION: &str = "v1";
pub const DEFAULT_CONTENT_API_URL: &str = "https://api.github.com";

/// Git-backed content repository the admin update endpoint commits to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContentRepo {
    /// Base URL of the contents API.
    pub api_url: String,
    pub owner: String,
    pub repo: String,
    pub branch: String,
}

impl Default for ContentRepo {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_CONTENT_API_URL.to_string(),
            owner: "adhilansari".to_string(),
            repo: "hadithDb".to_string(),
            branch: "main".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the same-origin API (`/api/editions`, `/api/hadith`).
    pub api_base_url: String,
    /// Base URL of the CDN-hosted dataset.
    pub cdn_base_url: String,
    pub content_repo: ContentRepo,
    /// Token for the content repository, only ever read from `GITHUB_TOKEN`.
    #[serde(skip)]
    pub content_token: Option<String>,
    pub admin_username: String,
    /// Argon2 PHC string for the admin password.
    pub admin_password_hash: Option<String>,
    /// Version suffix of the offline worker's cache names.
    pub cache_version: String,
    pub bind_addr: String,
    /// Origin the offline proxy forwards to.
    pub origin_url: Option<String>,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            cdn_base_url: DEFAULT_CDN_BASE_URL.to_string(),
            content_repo: ContentRepo::default(),
            content_token: None,
            admin_username: "admin".to_string(),
            admin_password_hash: None,
            cache_version: DEFAULT_CACHE_VERSION.to_string(),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            origin_url: None,
            log_dir: None,
        }
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        config.apply_env(|name| std::env::var(name).ok());
        Ok(config)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            serde_json::from_str(&contents)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Override fields from environment variables. `lookup` is injected so
    /// tests don't have to mutate the process environment.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(url) = non_empty("HADITHNET_API_URL") {
            self.api_base_url = url;
        }
        if let Some(url) = non_empty("HADITHNET_CDN_URL") {
            self.cdn_base_url = url;
        }
        if let Some(token) = non_empty("GITHUB_TOKEN") {
            self.content_token = Some(token);
        }
        if let Some(username) = non_empty("HADITHNET_ADMIN_USERNAME") {
            self.admin_username = username;
        }
        if let Some(hash) = non_empty("HADITHNET_ADMIN_PASSWORD_HASH") {
            self.admin_password_hash = Some(hash);
        }
        if let Some(addr) = non_empty("HADITHNET_BIND") {
            self.bind_addr = addr;
        }
        if let Some(origin) = non_empty("HADITHNET_ORIGIN_URL") {
            self.origin_url = Some(origin);
        }
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory of the persistent key/value area shared by the cache,
    /// bookmarks, settings and admin session.
    pub fn storage_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("storage"))
    }

    /// Directory holding the offline proxy's response caches.
    pub fn worker_cache_dir(&self) -> Result<PathBuf> {
        let data_dir =
            dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Could not find data directory"))?;
        Ok(data_dir.join(APP_NAME).join("worker-caches"))
    }
}
