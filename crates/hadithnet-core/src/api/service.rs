//! Read-through / write-through data access over the API and the cache.
//!
//! Every read checks the `CacheManager` first, falls back to the network on
//! a miss, and stores what it fetched. Cache write failures are logged and
//! never surfaced; the caller always gets the network result.

use std::sync::Arc;

use anyhow::Result;
use serde::{de::DeserializeOwned, Serialize};
use tracing::{debug, warn};

use crate::cache::{CacheKey, CacheManager, SetOutcome};
use crate::models::{
    BookStats, CombinedHadith, Editions, Hadith, HadithBook, TranslationSource,
    ORIGINAL_LANGUAGE,
};

use super::{ApiClient, ApiError};

/// Books scanned by a search without a book filter.
const SEARCH_BOOK_LIMIT: usize = 3;

/// Results kept per book by a search without a book filter.
const SEARCH_RESULTS_PER_BOOK: usize = 10;

/// How a failed fetch should be presented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchFailure {
    /// The resource does not exist upstream. Retrying will not help.
    NotFound,
    /// Network, server or parse failure. Worth retrying later.
    Transient,
}

impl FetchFailure {
    pub fn classify(err: &anyhow::Error) -> Self {
        let not_found = err
            .chain()
            .filter_map(|cause| cause.downcast_ref::<ApiError>())
            .any(ApiError::is_not_found);
        if not_found {
            FetchFailure::NotFound
        } else {
            FetchFailure::Transient
        }
    }

    pub fn user_message(&self) -> &'static str {
        match self {
            FetchFailure::NotFound => "Not available in this language",
            FetchFailure::Transient => "Something went wrong, please try again",
        }
    }
}

pub struct HadithService {
    api: ApiClient,
    cache: Arc<CacheManager>,
}

impl HadithService {
    pub fn new(api: ApiClient, cache: Arc<CacheManager>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &CacheManager {
        &self.cache
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    fn cached<T: DeserializeOwned>(&self, key: &CacheKey) -> Option<T> {
        let hit = self.cache.get(&key.to_storage_key());
        if hit.is_some() {
            debug!(key = %key, "Cache hit");
        }
        hit
    }

    fn store<T: Serialize>(&self, key: &CacheKey, data: &T) {
        match self.cache.set(&key.to_storage_key(), data) {
            Ok(SetOutcome::Stored) => {}
            Ok(SetOutcome::Skipped(reason)) => debug!(key = %key, ?reason, "Not cached"),
            Err(e) => warn!(key = %key, error = %e, "Cache write failed, continuing without cache"),
        }
    }

    // ===== Reads =====

    pub async fn get_editions(&self) -> Result<Editions> {
        let key = CacheKey::Editions;
        if let Some(editions) = self.cached(&key) {
            return Ok(editions);
        }
        let editions = self.api.fetch_editions().await?;
        self.store(&key, &editions);
        Ok(editions)
    }

    pub async fn get_hadith_data(&self, book: &str, language: &str) -> Result<HadithBook> {
        let key = CacheKey::hadith(book, language);
        if let Some(data) = self.cached(&key) {
            return Ok(data);
        }
        let data = self.api.fetch_hadith(book, language, None).await?;
        self.store(&key, &data);
        Ok(data)
    }

    /// Original-language hadiths of one section paired with their
    /// translation. Not cached: it is derived from two section fetches.
    pub async fn get_combined_hadith(
        &self,
        book: &str,
        section: &str,
        language: &str,
    ) -> Result<Vec<CombinedHadith>> {
        if language == ORIGINAL_LANGUAGE {
            let arabic = self
                .api
                .fetch_hadith(book, ORIGINAL_LANGUAGE, Some(section))
                .await?;
            return Ok(combine(arabic.hadiths.clone(), arabic.hadiths));
        }

        let (arabic, translation) = futures::try_join!(
            self.api.fetch_hadith(book, ORIGINAL_LANGUAGE, Some(section)),
            self.api.fetch_hadith(book, language, Some(section)),
        )?;
        Ok(combine(arabic.hadiths, translation.hadiths))
    }

    /// Case-insensitive substring search over translation text.
    ///
    /// With a book, every match in that book is returned. Without one, the
    /// first few books of the catalogue are searched and each contributes a
    /// bounded number of results; books that fail to load are skipped.
    pub async fn search_hadiths(
        &self,
        query: &str,
        book: Option<&str>,
        language: &str,
    ) -> Result<Vec<CombinedHadith>> {
        let term = query.trim().to_lowercase();
        if term.is_empty() {
            return Ok(Vec::new());
        }

        if let Some(book) = book {
            return self.search_book(&term, book, language).await;
        }

        let editions = self.get_editions().await?;
        let mut results = Vec::new();
        for book in editions.book_ids().take(SEARCH_BOOK_LIMIT) {
            match self.search_book(&term, book, language).await {
                Ok(found) => results.extend(found.into_iter().take(SEARCH_RESULTS_PER_BOOK)),
                Err(e) => warn!(book, error = %e, "Search failed for book"),
            }
        }
        Ok(results)
    }

    async fn search_book(
        &self,
        term: &str,
        book: &str,
        language: &str,
    ) -> Result<Vec<CombinedHadith>> {
        let (translation, arabic) = futures::try_join!(
            self.get_hadith_data(book, language),
            self.get_hadith_data(book, ORIGINAL_LANGUAGE),
        )?;

        Ok(translation
            .hadiths
            .into_iter()
            .filter(|h| h.text.to_lowercase().contains(term))
            .map(|translation| {
                let arabic = arabic
                    .find(translation.hadithnumber)
                    .cloned()
                    .unwrap_or_else(|| translation.clone());
                CombinedHadith {
                    arabic,
                    translation,
                    translation_source: TranslationSource::Translation,
                }
            })
            .collect())
    }

    /// Summary numbers for a book. Any failure yields zeros.
    pub async fn get_book_stats(&self, book: &str) -> BookStats {
        let fetched = futures::try_join!(
            self.get_hadith_data(book, ORIGINAL_LANGUAGE),
            self.get_editions(),
        );
        match fetched {
            Ok((arabic, editions)) => BookStats {
                total_hadiths: arabic.hadiths.len(),
                total_sections: arabic.section_ids().len(),
                available_languages: editions
                    .get(book)
                    .map(|e| e.language_names())
                    .unwrap_or_default(),
            },
            Err(e) => {
                warn!(book, error = %e, "Failed to load book stats");
                BookStats::default()
            }
        }
    }
}

/// Pair each original-language hadith with the translation of the same
/// number. Hadiths without a translation keep themselves as the
/// translation, marked `Fallback`, so none are dropped.
pub fn combine(arabic: Vec<Hadith>, translations: Vec<Hadith>) -> Vec<CombinedHadith> {
    arabic
        .into_iter()
        .map(|original| {
            match translations
                .iter()
                .find(|t| t.hadithnumber == original.hadithnumber)
            {
                Some(translation) => CombinedHadith {
                    translation: translation.clone(),
                    arabic: original,
                    translation_source: TranslationSource::Translation,
                },
                None => CombinedHadith {
                    translation: original.clone(),
                    arabic: original,
                    translation_source: TranslationSource::Fallback,
                },
            }
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use axum::extract::{Query, State};
    use axum::http::StatusCode;
    use axum::response::{IntoResponse, Response};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    use crate::models::HadithNumber;
    use crate::storage::MemoryStorage;

    fn hadith(number: u32, text: &str) -> Hadith {
        Hadith {
            hadithnumber: HadithNumber::from(number),
            arabicnumber: HadithNumber::from(number),
            text: text.to_string(),
            grades: Vec::new(),
            reference: None,
        }
    }

    #[derive(Clone, Default)]
    struct FakeApi {
        hits: Arc<AtomicUsize>,
    }

    fn book_json(language: &str) -> Option<Value> {
        let hadiths = match language {
            "ara" => json!([
                {"hadithnumber": 1, "text": "إنما الأعمال بالنيات"},
                {"hadithnumber": 2, "text": "الدين النصيحة"},
                {"hadithnumber": 3, "text": "من حسن إسلام المرء"}
            ]),
            "eng" => json!([
                {"hadithnumber": 1, "text": "Actions are by intentions"},
                {"hadithnumber": 3, "text": "Leaving what does not concern one"}
            ]),
            _ => return None,
        };
        Some(json!({
            "metadata": {"name": "Sahih al Bukhari", "sections": {"0": "", "1": "Revelation", "2": "Belief"}},
            "hadiths": hadiths
        }))
    }

    async fn hadith_route(
        State(api): State<FakeApi>,
        Query(q): Query<HashMap<String, String>>,
    ) -> Response {
        api.hits.fetch_add(1, Ordering::SeqCst);
        let language = q.get("language").cloned().unwrap_or_default();
        match (q.get("book").map(String::as_str), book_json(&language)) {
            (Some("bukhari"), Some(body)) => Json(body).into_response(),
            _ => (
                StatusCode::NOT_FOUND,
                Json(json!({"error": format!("Book not found in {} language", language)})),
            )
                .into_response(),
        }
    }

    async fn editions_route(State(api): State<FakeApi>) -> Json<Value> {
        api.hits.fetch_add(1, Ordering::SeqCst);
        Json(json!({
            "bukhari": {"name": "Sahih al Bukhari", "collection": [
                {"name": "ara-bukhari", "language": "Arabic"},
                {"name": "eng-bukhari", "language": "English"}
            ]},
            "missing": {"name": "Missing", "collection": []}
        }))
    }

    async fn service() -> (HadithService, FakeApi) {
        let api = FakeApi::default();
        let router = Router::new()
            .route("/api/hadith", get(hadith_route))
            .route("/api/editions", get(editions_route))
            .with_state(api.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = ApiClient::new(format!("http://{}", addr)).unwrap();
        let cache = Arc::new(CacheManager::new(Arc::new(MemoryStorage::new())));
        (HadithService::new(client, cache), api)
    }

    #[test]
    fn test_combine_falls_back_for_missing_translation() {
        let arabic = vec![hadith(1, "a1"), hadith(2, "a2"), hadith(3, "a3")];
        let translations = vec![hadith(1, "t1"), hadith(3, "t3")];

        let combined = combine(arabic, translations);
        assert_eq!(combined.len(), 3);
        assert_eq!(combined[0].translation.text, "t1");
        assert_eq!(combined[1].translation.text, "a2");
        assert!(combined[1].is_fallback());
        assert!(!combined[2].is_fallback());
    }

    #[test]
    fn test_classify_failures() {
        let not_found: anyhow::Error = ApiError::NotFound("x".into()).into();
        let wrapped = not_found.context("Failed to load book");
        assert_eq!(FetchFailure::classify(&wrapped), FetchFailure::NotFound);

        let offline: anyhow::Error = ApiError::Offline.into();
        assert_eq!(FetchFailure::classify(&offline), FetchFailure::Transient);
        assert_eq!(
            FetchFailure::classify(&anyhow::anyhow!("parse error")),
            FetchFailure::Transient
        );
    }

    #[tokio::test]
    async fn test_hadith_data_is_read_through_cached() {
        let (service, api) = service().await;

        let first = service.get_hadith_data("bukhari", "eng").await.unwrap();
        let second = service.get_hadith_data("Bukhari", "eng").await.unwrap();
        assert_eq!(first, second);
        assert_eq!(api.hits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_not_found_is_distinguished() {
        let (service, _) = service().await;
        let err = service.get_hadith_data("bukhari", "xyz").await.unwrap_err();
        assert_eq!(FetchFailure::classify(&err), FetchFailure::NotFound);
    }

    #[tokio::test]
    async fn test_combined_hadith_joins_and_is_not_cached() {
        let (service, api) = service().await;

        let combined = service.get_combined_hadith("bukhari", "1", "eng").await.unwrap();
        assert_eq!(combined.len(), 3);
        assert!(combined[1].is_fallback());
        assert_eq!(combined[1].translation.text, combined[1].arabic.text);

        service.get_combined_hadith("bukhari", "1", "eng").await.unwrap();
        assert_eq!(api.hits.load(Ordering::SeqCst), 4);
        assert_eq!(service.cache().stats().total_items, 0);
    }

    #[tokio::test]
    async fn test_search_single_book() {
        let (service, _) = service().await;

        let results = service
            .search_hadiths("  INTENTIONS ", Some("bukhari"), "eng")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].arabic.text, "إنما الأعمال بالنيات");

        assert!(service.search_hadiths("   ", None, "eng").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_all_books_skips_failures() {
        let (service, _) = service().await;
        let results = service.search_hadiths("concern", None, "eng").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].number(), HadithNumber::from(3));
    }

    #[tokio::test]
    async fn test_book_stats() {
        let (service, _) = service().await;

        let stats = service.get_book_stats("bukhari").await;
        assert_eq!(stats.total_hadiths, 3);
        assert_eq!(stats.total_sections, 2);
        assert_eq!(stats.available_languages, vec!["Arabic", "English"]);

        assert_eq!(service.get_book_stats("missing").await, BookStats::default());
    }
}
