//! HTTP client for the same-origin hadith API.
//!
//! The API server proxies the CDN-hosted dataset, so every method here maps
//! one-to-one onto a route: `/api/editions`, `/api/hadith` and
//! `/api/admin/update-translation`.

use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, RequestBuilder};
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::models::{
    AdminEndpointStatus, Editions, HadithBook, UpdateTranslationRequest,
    UpdateTranslationResponse,
};

use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting, doubled per retry.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// API client for the hadith routes.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Check if response is successful, returning an error with body if not.
    /// Returns Ok(None) for rate limit (should retry).
    async fn check_response_for_retry(
        response: reqwest::Response,
    ) -> Result<Option<reqwest::Response>> {
        if response.status().is_success() {
            Ok(Some(response))
        } else if response.status().as_u16() == 429 {
            Ok(None)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    /// Send a request, backing off and resending while rate limited.
    async fn send_json<T: DeserializeOwned>(
        &self,
        url: &str,
        build: impl Fn() -> RequestBuilder,
    ) -> Result<T> {
        let mut retries = 0;
        let mut backoff_ms = INITIAL_BACKOFF_MS;

        loop {
            let response = build()
                .send()
                .await
                .map_err(ApiError::NetworkError)
                .with_context(|| format!("Failed to send request to {}", url))?;

            match Self::check_response_for_retry(response).await? {
                Some(response) => {
                    return response
                        .json()
                        .await
                        .with_context(|| format!("Failed to parse JSON response from {}", url));
                }
                None => {
                    retries += 1;
                    if retries > MAX_RATE_LIMIT_RETRIES {
                        return Err(ApiError::RateLimited.into());
                    }
                    warn!(url, retry = retries, backoff_ms, "Rate limited, backing off");
                    tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    backoff_ms *= 2;
                }
            }
        }
    }

    async fn get<T: DeserializeOwned, Q: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &Q,
    ) -> Result<T> {
        let url = self.url(path);
        self.send_json(&url, || self.client.get(&url).query(query))
            .await
    }

    async fn post<T: DeserializeOwned, B: Serialize>(&self, path: &str, body: &B) -> Result<T> {
        let url = self.url(path);
        self.send_json(&url, || self.client.post(&url).json(body))
            .await
    }

    // ===== Data Fetching Methods =====

    pub async fn fetch_editions(&self) -> Result<Editions> {
        debug!("Fetching editions");
        self.get("/api/editions", &[] as &[(&str, &str)]).await
    }

    /// Fetch one book in one language, optionally narrowed to a section.
    pub async fn fetch_hadith(
        &self,
        book: &str,
        language: &str,
        section: Option<&str>,
    ) -> Result<HadithBook> {
        debug!(book, language, ?section, "Fetching hadith data");
        let mut query = vec![("book", book), ("language", language)];
        if let Some(section) = section {
            query.push(("section", section));
        }
        self.get("/api/hadith", &query).await
    }

    // ===== Admin =====

    pub async fn update_translation(
        &self,
        request: &UpdateTranslationRequest,
    ) -> Result<UpdateTranslationResponse> {
        self.post("/api/admin/update-translation", request)
            .await
            .context("Failed to update translation")
    }

    pub async fn admin_status(&self) -> Result<AdminEndpointStatus> {
        self.get("/api/admin/update-translation", &[] as &[(&str, &str)])
            .await
    }
}
