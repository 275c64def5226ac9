//! Same-origin API routes.
//!
//! - `GET /api/editions`: catalogue of collections
//! - `GET /api/hadith?book=&language=&section=`: one book, optionally one section
//! - `POST /api/admin/update-translation`: commit an edited hadith text
//! - `GET /api/admin/update-translation`: endpoint status
//! - `GET /manifest.json`: web app manifest

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::body::Bytes;
use axum::extract::{Query, State};
use axum::http::header::CACHE_CONTROL;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use hadithnet_core::config::Config;
use hadithnet_core::models::{
    AdminEndpointStatus, HadithNumber, SectionDetail, UpdateTranslationRequest,
    UpdateTranslationResponse,
};

use crate::cdn::{book_path, is_valid_id, CdnClient};
use crate::content::ContentRepoClient;
use crate::error::AppError;
use crate::manifest::manifest;

/// Dataset responses may be cached by shared caches for a day.
const DATASET_CACHE_CONTROL: &str = "public, s-maxage=86400, stale-while-revalidate=86400";

const DEFAULT_LANGUAGE: &str = "eng";

pub struct ServerState {
    pub cdn: CdnClient,
    /// Absent when no content token is configured.
    pub content: Option<ContentRepoClient>,
}

impl ServerState {
    pub fn from_config(config: &Config) -> Result<Self> {
        let cdn = CdnClient::new(&config.cdn_base_url, &config.content_repo.branch)?;
        let content = match &config.content_token {
            Some(token) => Some(ContentRepoClient::new(
                config.content_repo.clone(),
                token.clone(),
            )?),
            None => None,
        };
        Ok(Self { cdn, content })
    }
}

pub fn router(state: Arc<ServerState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/editions", get(editions))
        .route("/api/hadith", get(hadith))
        .route(
            "/api/admin/update-translation",
            get(admin_status).post(update_translation),
        )
        .route("/manifest.json", get(web_manifest))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ===== Dataset =====

async fn editions(State(state): State<Arc<ServerState>>) -> Result<Response, AppError> {
    match state.cdn.fetch_editions().await {
        Ok(data) => Ok(([(CACHE_CONTROL, DATASET_CACHE_CONTROL)], Json(data)).into_response()),
        Err(e) => {
            error!(error = %e, "Error fetching editions");
            Err(AppError::internal("Failed to fetch editions"))
        }
    }
}

#[derive(Debug, Deserialize)]
struct HadithQuery {
    book: Option<String>,
    section: Option<String>,
    language: Option<String>,
}

async fn hadith(
    State(state): State<Arc<ServerState>>,
    Query(params): Query<HadithQuery>,
) -> Result<Response, AppError> {
    let Some(book) = params.book.filter(|b| !b.is_empty()) else {
        return Err(AppError::BadRequest("Book parameter is required".to_string()));
    };
    let language = params
        .language
        .filter(|l| !l.is_empty())
        .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

    let mut data = match state.cdn.fetch_book(&book, &language).await {
        Ok(data) => data,
        Err(e) if e.is_not_found() => {
            return Err(AppError::NotFound(format!(
                "Book \"{}\" not found in {} language",
                book, language
            )));
        }
        Err(e) => {
            error!(%book, %language, error = %e, "Error fetching hadith data");
            return Err(AppError::internal("Failed to fetch hadith data"));
        }
    };

    if let Some(section) = params.section.filter(|s| !s.is_empty()) {
        filter_section(&mut data, &section)?;
    }

    Ok(([(CACHE_CONTROL, DATASET_CACHE_CONTROL)], Json(data)).into_response())
}

/// Keep only the hadiths whose number falls in the section's registered
/// range.
fn filter_section(data: &mut Value, section: &str) -> Result<(), AppError> {
    let detail = data
        .get("metadata")
        .and_then(|m| m.get("section_details"))
        .and_then(|d| d.get(section))
        .cloned()
        .ok_or_else(|| AppError::NotFound(format!("Section {} not found", section)))?;
    let detail: SectionDetail = serde_json::from_value(detail).map_err(|e| {
        error!(section, error = %e, "Malformed section details");
        AppError::internal("Failed to fetch hadith data")
    })?;

    if let Some(hadiths) = data.get_mut("hadiths").and_then(Value::as_array_mut) {
        hadiths.retain(|h| {
            h.get("hadithnumber")
                .and_then(Value::as_f64)
                .is_some_and(|n| detail.contains(HadithNumber(n)))
        });
    }
    Ok(())
}

// ===== Admin =====

async fn admin_status(State(state): State<Arc<ServerState>>) -> Json<AdminEndpointStatus> {
    Json(AdminEndpointStatus {
        status: "API endpoint active".to_string(),
        github_configured: state.content.is_some(),
    })
}

async fn update_translation(
    State(state): State<Arc<ServerState>>,
    body: Bytes,
) -> Result<Json<UpdateTranslationResponse>, AppError> {
    let Some(content) = state.content.as_ref() else {
        error!("Content repository token not configured");
        return Err(AppError::internal("Server configuration error"));
    };

    let request: UpdateTranslationRequest = serde_json::from_slice(&body).map_err(|e| {
        let cause = anyhow::Error::new(e).context("Invalid request body");
        error!(error = %cause, "Update translation error");
        AppError::internal_with("Failed to update translation", &cause)
    })?;

    let missing = request.missing_fields();
    if !missing.is_empty() {
        warn!(?missing, "Update translation rejected");
        return Err(AppError::BadRequest("Missing required fields".to_string()));
    }
    if !is_valid_id(&request.book) || !is_valid_id(&request.language) {
        warn!(book = %request.book, language = %request.language, "Update translation rejected");
        return Err(AppError::BadRequest("Invalid book or language".to_string()));
    }

    match commit_translation(content, &request).await {
        Ok(Some(commit)) => Ok(Json(UpdateTranslationResponse {
            success: true,
            message: "Translation updated successfully".to_string(),
            commit,
        })),
        Ok(None) => Err(AppError::NotFound("Hadith not found".to_string())),
        Err(e) => {
            error!(error = %format!("{:#}", e), "Update translation error");
            Err(AppError::internal_with("Failed to update translation", &e))
        }
    }
}

/// Rewrite one hadith's text and commit the file. `Ok(None)` when the book
/// has no hadith with that number.
async fn commit_translation(
    content: &ContentRepoClient,
    request: &UpdateTranslationRequest,
) -> Result<Option<String>> {
    let path = book_path(&request.book, &request.language);
    let file = content.get_file(&path).await?;
    let mut data: Value =
        serde_json::from_str(&file.content).context("Repository file is not valid JSON")?;

    let number = request.hadith_number.unwrap_or_default();
    let Some(hadith) = data
        .get_mut("hadiths")
        .and_then(Value::as_array_mut)
        .and_then(|hadiths| {
            hadiths.iter_mut().find(|h| {
                h.get("hadithnumber").and_then(Value::as_f64) == Some(number.value())
            })
        })
    else {
        return Ok(None);
    };
    hadith["text"] = Value::String(request.text.clone());

    let updated = serde_json::to_string_pretty(&data)?;
    let commit = content
        .put_file(&path, &updated, &file.sha, &request.commit_message())
        .await?;
    info!(
        book = %request.book,
        language = %request.language,
        hadith = %number,
        "Translation updated"
    );
    Ok(Some(commit))
}

async fn web_manifest() -> Json<Value> {
    Json(manifest())
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use axum::extract::Path;
    use axum::http::{StatusCode, Uri};
    use axum::routing::get as get_route;
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use hadithnet_core::config::ContentRepo;
    use serde_json::json;

    const CDN_PREFIX: &str = "/gh/adhilansari/hadithDb";

    fn book_json() -> Value {
        json!({
            "metadata": {
                "name": "Sahih al Bukhari",
                "sections": {"1": "Revelation", "2": "Belief"},
                "section_details": {
                    "1": {"hadithnumber_first": 1, "hadithnumber_last": 2,
                          "arabicnumber_first": 1, "arabicnumber_last": 2},
                    "2": {"hadithnumber_first": 3, "hadithnumber_last": 3,
                          "arabicnumber_first": 3, "arabicnumber_last": 3}
                }
            },
            "hadiths": [
                {"hadithnumber": 1, "arabicnumber": 1, "text": "one"},
                {"hadithnumber": 2, "arabicnumber": 2, "text": "two"},
                {"hadithnumber": 3, "arabicnumber": 3, "text": "three"}
            ]
        })
    }

    async fn fake_cdn(uri: Uri) -> Response {
        let path = uri.path().trim_start_matches(CDN_PREFIX);
        match path {
            "@v2/editions.min.json" => Json(json!({"bukhari": {"name": "Sahih al Bukhari",
                "collection": []}}))
            .into_response(),
            "@main/translations/eng-bukhari.min.json" | "@main/data/ara-bukhari.min.json" => {
                Json(book_json()).into_response()
            }
            "@main/translations/eng-broken.min.json" => {
                StatusCode::INTERNAL_SERVER_ERROR.into_response()
            }
            _ => StatusCode::NOT_FOUND.into_response(),
        }
    }

    #[derive(Default)]
    struct FakeRepo {
        commits: Mutex<Vec<Value>>,
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    async fn spawn_repo(repo: Arc<FakeRepo>) -> String {
        let router = Router::new()
            .route(
                "/repos/:owner/:repo/contents/*path",
                get_route(|Path((_, _, path)): Path<(String, String, String)>| async move {
                    if path.trim_start_matches('/') != "translations/eng-bukhari.min.json" {
                        return StatusCode::NOT_FOUND.into_response();
                    }
                    let raw = serde_json::to_string(&book_json()).unwrap();
                    let encoded = STANDARD.encode(raw);
                    // Wrapped the way the contents API returns it.
                    let wrapped = encoded
                        .as_bytes()
                        .chunks(60)
                        .map(|c| std::str::from_utf8(c).unwrap())
                        .collect::<Vec<_>>()
                        .join("\n");
                    Json(json!({"content": wrapped, "sha": "blob-sha"})).into_response()
                })
                .put(
                    |State(repo): State<Arc<FakeRepo>>, Json(body): Json<Value>| async move {
                        repo.commits.lock().unwrap().push(body);
                        Json(json!({"commit": {"sha": "commit-sha"}}))
                    },
                ),
            )
            .with_state(repo);
        spawn(router).await
    }

    async fn spawn_server(repo_url: Option<String>) -> String {
        let cdn_base = spawn(Router::new().fallback(fake_cdn)).await;
        let mut config = Config {
            cdn_base_url: format!("{}{}", cdn_base, CDN_PREFIX),
            ..Default::default()
        };
        if let Some(api_url) = repo_url {
            config.content_repo = ContentRepo {
                api_url,
                ..Default::default()
            };
            config.content_token = Some("test-token".to_string());
        }
        let state = Arc::new(ServerState::from_config(&config).unwrap());
        spawn(router(state)).await
    }

    #[tokio::test]
    async fn test_editions_with_cache_control() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/editions", base)).await.unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(
            response.headers()["cache-control"],
            "public, s-maxage=86400, stale-while-revalidate=86400"
        );
        let body: Value = response.json().await.unwrap();
        assert!(body.get("bukhari").is_some());
    }

    #[tokio::test]
    async fn test_hadith_requires_book() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/hadith", base)).await.unwrap();
        assert_eq!(response.status(), 400);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Book parameter is required");
    }

    #[tokio::test]
    async fn test_hadith_defaults_to_english() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/hadith?book=bukhari", base))
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["hadiths"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_hadith_unknown_language() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/hadith?book=bukhari&language=xyz", base))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Book \"bukhari\" not found in xyz language");
    }

    #[tokio::test]
    async fn test_hadith_section_filter() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!(
            "{}/api/hadith?book=bukhari&language=ara&section=1",
            base
        ))
        .await
        .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        let numbers: Vec<u64> = body["hadiths"]
            .as_array()
            .unwrap()
            .iter()
            .map(|h| h["hadithnumber"].as_u64().unwrap())
            .collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(body["metadata"]["name"], "Sahih al Bukhari");
    }

    #[tokio::test]
    async fn test_hadith_unknown_section() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/hadith?book=bukhari&section=99", base))
            .await
            .unwrap();
        assert_eq!(response.status(), 404);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Section 99 not found");
    }

    #[tokio::test]
    async fn test_hadith_upstream_failure() {
        let base = spawn_server(None).await;
        let response = reqwest::get(format!("{}/api/hadith?book=broken", base))
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Failed to fetch hadith data");
    }

    #[tokio::test]
    async fn test_admin_status_and_missing_token() {
        let base = spawn_server(None).await;
        let status: Value = reqwest::get(format!("{}/api/admin/update-translation", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["status"], "API endpoint active");
        assert_eq!(status["githubConfigured"], false);

        let response = reqwest::Client::new()
            .post(format!("{}/api/admin/update-translation", base))
            .json(&json!({"book": "bukhari", "language": "eng", "hadithNumber": 1, "text": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 500);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"], "Server configuration error");
    }

    #[tokio::test]
    async fn test_update_translation_commits() {
        let repo = Arc::new(FakeRepo::default());
        let base = spawn_server(Some(spawn_repo(Arc::clone(&repo)).await)).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/admin/update-translation", base))
            .json(&json!({"book": "bukhari", "language": "eng", "hadithNumber": 2,
                          "text": "edited two"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Translation updated successfully");
        assert_eq!(body["commit"], "commit-sha");

        let commits = repo.commits.lock().unwrap();
        assert_eq!(commits.len(), 1);
        assert_eq!(
            commits[0]["message"],
            "Update eng translation for bukhari hadith #2"
        );
        assert_eq!(commits[0]["sha"], "blob-sha");
        assert_eq!(commits[0]["branch"], "main");
        let decoded = STANDARD
            .decode(commits[0]["content"].as_str().unwrap())
            .unwrap();
        let updated: Value = serde_json::from_slice(&decoded).unwrap();
        assert_eq!(updated["hadiths"][1]["text"], "edited two");
        assert_eq!(updated["hadiths"][0]["text"], "one");
    }

    #[tokio::test]
    async fn test_update_translation_validation() {
        let repo = Arc::new(FakeRepo::default());
        let base = spawn_server(Some(spawn_repo(Arc::clone(&repo)).await)).await;
        let client = reqwest::Client::new();
        let url = format!("{}/api/admin/update-translation", base);

        let missing = client
            .post(&url)
            .json(&json!({"book": "bukhari", "language": "eng"}))
            .send()
            .await
            .unwrap();
        assert_eq!(missing.status(), 400);

        let unknown = client
            .post(&url)
            .json(&json!({"book": "bukhari", "language": "eng", "hadithNumber": 42,
                          "text": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(unknown.status(), 404);
        let body: Value = unknown.json().await.unwrap();
        assert_eq!(body["error"], "Hadith not found");

        let no_file = client
            .post(&url)
            .json(&json!({"book": "muslim", "language": "eng", "hadithNumber": 1,
                          "text": "x"}))
            .send()
            .await
            .unwrap();
        assert_eq!(no_file.status(), 500);
        let body: Value = no_file.json().await.unwrap();
        assert_eq!(body["error"], "Failed to update translation");
        assert!(body["details"].as_str().unwrap().contains("Failed to fetch file"));

        for (book, language) in [("../bukhari", "eng"), ("bukhari", "eng/../../x")] {
            let invalid = client
                .post(&url)
                .json(&json!({"book": book, "language": language, "hadithNumber": 1,
                              "text": "x"}))
                .send()
                .await
                .unwrap();
            assert_eq!(invalid.status(), 400);
            let body: Value = invalid.json().await.unwrap();
            assert_eq!(body["error"], "Invalid book or language");
        }

        assert!(repo.commits.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_manifest_route() {
        let base = spawn_server(None).await;
        let body: Value = reqwest::get(format!("{}/manifest.json", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["short_name"], "Hadith.net");
    }
}
