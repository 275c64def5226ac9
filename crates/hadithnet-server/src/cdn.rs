//! Client for the CDN-hosted hadith dataset.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Release tag the editions catalogue is read from.
const EDITIONS_REF: &str = "v2";

#[derive(Error, Debug)]
pub enum UpstreamError {
    #[error("HTTP error! status: {0}")]
    Status(StatusCode),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl UpstreamError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Status(status) if *status == StatusCode::NOT_FOUND)
    }
}

/// Repository path of one book in one language. The original Arabic text
/// lives under `data/`, translations under `translations/`.
pub fn book_path(book: &str, language: &str) -> String {
    if language == "ara" {
        format!("data/ara-{}.min.json", book)
    } else {
        format!("translations/{}-{}.min.json", language, book)
    }
}

/// Book and language ids are lowercase ASCII letters, digits and dashes, so
/// they can never climb out of their directory in a repository path.
pub fn is_valid_id(id: &str) -> bool {
    !id.is_empty()
        && id
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

#[derive(Clone)]
pub struct CdnClient {
    client: Client,
    base_url: String,
    data_ref: String,
}

impl CdnClient {
    /// `data_ref` is the branch book files are read from.
    pub fn new(base_url: &str, data_ref: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create CDN client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            data_ref: data_ref.to_string(),
        })
    }

    pub fn editions_url(&self) -> String {
        format!("{}@{}/editions.min.json", self.base_url, EDITIONS_REF)
    }

    pub fn book_url(&self, book: &str, language: &str) -> String {
        format!(
            "{}@{}/{}",
            self.base_url,
            self.data_ref,
            book_path(book, language)
        )
    }

    pub async fn fetch_editions(&self) -> Result<Value, UpstreamError> {
        self.get_json(&self.editions_url()).await
    }

    pub async fn fetch_book(&self, book: &str, language: &str) -> Result<Value, UpstreamError> {
        self.get_json(&self.book_url(book, language)).await
    }

    async fn get_json(&self, url: &str) -> Result<Value, UpstreamError> {
        debug!(url, "CDN request");
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        Ok(response.json().await?)
    }
}
