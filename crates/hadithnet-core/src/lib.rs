//! Hadith.net core - shared library for reading hadith collections.
//!
//! This crate contains everything the server and the command-line reader
//! share:
//! - Data models for the hadith dataset and admin payloads
//! - A key/value storage layer with a bounded, self-evicting cache on top
//! - API client and data-access service with read-through caching
//! - Reader state: settings and bookmarks
//! - Admin session handling
//! - The offline worker that intercepts requests for offline use

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod install;
pub mod models;
pub mod state;
pub mod storage;
pub mod utils;
pub mod worker;

pub use api::{ApiClient, ApiError, FetchFailure, HadithService};
pub use cache::{CacheManager, CacheStats};
pub use config::Config;
pub use models::{CombinedHadith, Editions, Hadith, HadithBook, HadithNumber};
pub use state::AppState;
pub use storage::{FileStorage, KeyValueStorage, MemoryStorage};
