//! Offline caching proxy: every request is handed to the offline worker.
//!
//! Requests in origin form (`GET /book/bukhari`) are resolved against the
//! configured origin. Requests in absolute form, as sent to a forward
//! proxy, keep their own URL, which is how dataset requests to the CDN
//! reach the worker.

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::header::ACCEPT;
use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use hadithnet_core::worker::{
    is_hop_by_hop, Destination, Network, OfflineWorker, RequestMode, WorkerMessage,
    WorkerRequest, WorkerResponse,
};
use reqwest::Url;

/// Largest request body forwarded upstream.
const MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

pub fn proxy_router<N: Network>(worker: Arc<OfflineWorker<N>>) -> Router {
    Router::new()
        .route("/__worker/skip-waiting", post(skip_waiting::<N>))
        .route("/__worker/status", get(status::<N>))
        .fallback(intercept::<N>)
        .layer(TraceLayer::new_for_http())
        .with_state(worker)
}

async fn skip_waiting<N: Network>(State(worker): State<Arc<OfflineWorker<N>>>) -> Json<Value> {
    let state = worker.post_message(WorkerMessage::SkipWaiting);
    info!(%state, "Skip-waiting received");
    Json(json!({ "state": state.to_string() }))
}

async fn status<N: Network>(State(worker): State<Arc<OfflineWorker<N>>>) -> Json<Value> {
    let caches: Vec<Value> = worker
        .caches()
        .summary()
        .into_iter()
        .map(|(name, entries, bytes)| json!({ "name": name, "entries": entries, "bytes": bytes }))
        .collect();
    Json(json!({
        "state": worker.state().to_string(),
        "origin": worker.origin().as_str(),
        "caches": caches,
    }))
}

async fn intercept<N: Network>(
    State(worker): State<Arc<OfflineWorker<N>>>,
    request: Request,
) -> Response {
    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, MAX_BODY_BYTES).await {
        Ok(body) => body,
        Err(e) => {
            debug!(error = %e, "Rejected request body");
            return StatusCode::PAYLOAD_TOO_LARGE.into_response();
        }
    };
    let Some(url) = resolve_url(worker.origin(), &parts.uri) else {
        return StatusCode::BAD_REQUEST.into_response();
    };

    let request = to_worker_request(parts.method.as_str(), url, &parts.headers, body.to_vec());
    into_http(worker.handle_fetch(request).await)
}

fn resolve_url(origin: &Url, uri: &Uri) -> Option<Url> {
    if uri.scheme().is_some() {
        return Url::parse(&uri.to_string()).ok();
    }
    let mut url = origin.clone();
    url.set_path(uri.path());
    url.set_query(uri.query());
    Some(url)
}

fn to_worker_request(method: &str, url: Url, headers: &HeaderMap, body: Vec<u8>) -> WorkerRequest {
    let header = |name: &str| headers.get(name).and_then(|v| v.to_str().ok());

    let destination = header("sec-fetch-dest")
        .map(Destination::from_fetch_dest)
        .unwrap_or_default();
    // Clients without fetch metadata announce page loads through Accept.
    let mode = match header("sec-fetch-mode") {
        Some(mode) => RequestMode::from_fetch_mode(mode),
        None if header(ACCEPT.as_str()).is_some_and(|a| a.contains("text/html")) => {
            RequestMode::Navigate
        }
        None => RequestMode::default(),
    };

    let mut forwarded = std::collections::BTreeMap::new();
    for (name, value) in headers {
        if is_hop_by_hop(name.as_str()) {
            continue;
        }
        if let Ok(value) = value.to_str() {
            forwarded.insert(name.as_str().to_string(), value.to_string());
        }
    }

    WorkerRequest {
        method: method.to_string(),
        url,
        destination,
        mode,
        headers: forwarded,
        body,
    }
}

fn into_http(response: WorkerResponse) -> Response {
    let status = StatusCode::from_u16(response.status).unwrap_or(StatusCode::BAD_GATEWAY);
    let mut headers = HeaderMap::new();
    for (name, value) in &response.headers {
        if is_hop_by_hop(name) {
            continue;
        }
        if let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) {
            headers.insert(name, value);
        }
    }
    (status, headers, Body::from(response.body)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use hadithnet_core::worker::CacheStorage;

    /// In-process origin that can be taken offline.
    #[derive(Default)]
    struct FakeOrigin {
        pages: Mutex<HashMap<String, WorkerResponse>>,
        offline: AtomicBool,
    }

    struct FakeNetwork(Arc<FakeOrigin>);

    impl Network for FakeNetwork {
        async fn fetch(&self, request: &WorkerRequest) -> anyhow::Result<WorkerResponse> {
            let origin = &self.0;
            if origin.offline.load(Ordering::SeqCst) {
                anyhow::bail!("connection refused");
            }
            if request.method == "POST" {
                return Ok(WorkerResponse::new(201, request.body.clone()));
            }
            Ok(origin
                .pages
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned()
                .unwrap_or_else(|| WorkerResponse::new(404, Vec::new())))
        }
    }

    async fn spawn_proxy(origin: Arc<FakeOrigin>, caches: Arc<CacheStorage>) -> String {
        origin.pages.lock().unwrap().insert(
            "http://origin.test/".to_string(),
            WorkerResponse::html(200, "<html>home</html>"),
        );
        let worker = Arc::new(OfflineWorker::new(
            FakeNetwork(origin),
            caches,
            "http://origin.test".parse().unwrap(),
            "v1",
        ));
        worker.register().await;

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let router = proxy_router(worker);
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_resolve_url() {
        let origin: Url = "http://origin.test".parse().unwrap();
        let relative: Uri = "/book/bukhari?lang=eng".parse().unwrap();
        assert_eq!(
            resolve_url(&origin, &relative).unwrap().as_str(),
            "http://origin.test/book/bukhari?lang=eng"
        );
        let absolute: Uri = "http://cdn.jsdelivr.net/gh/x/editions.min.json".parse().unwrap();
        assert_eq!(
            resolve_url(&origin, &absolute).unwrap().host_str(),
            Some("cdn.jsdelivr.net")
        );
    }

    #[test]
    fn test_fetch_metadata_mapping() {
        let url: Url = "http://origin.test/".parse().unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("sec-fetch-dest", HeaderValue::from_static("style"));
        headers.insert("connection", HeaderValue::from_static("keep-alive"));
        let request = to_worker_request("GET", url.clone(), &headers, Vec::new());
        assert_eq!(request.destination, Destination::Style);
        assert_eq!(request.mode, RequestMode::SameOrigin);
        assert!(!request.headers.contains_key("connection"));

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("text/html,application/xhtml+xml"));
        let request = to_worker_request("GET", url, &headers, Vec::new());
        assert!(request.is_navigation());
    }

    #[tokio::test]
    async fn test_offline_page_load_served_from_cache() {
        let origin = Arc::new(FakeOrigin::default());
        let base = spawn_proxy(Arc::clone(&origin), Arc::new(CacheStorage::new())).await;
        origin.offline.store(true, Ordering::SeqCst);

        let response = reqwest::Client::new()
            .get(format!("{}/book/bukhari", base))
            .header("sec-fetch-mode", "navigate")
            .header("sec-fetch-dest", "document")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 200);
        assert_eq!(response.text().await.unwrap(), "<html>home</html>");
    }

    #[tokio::test]
    async fn test_post_passes_through() {
        let origin = Arc::new(FakeOrigin::default());
        let base = spawn_proxy(origin, Arc::new(CacheStorage::new())).await;

        let response = reqwest::Client::new()
            .post(format!("{}/api/admin/update-translation", base))
            .body("payload")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        assert_eq!(response.text().await.unwrap(), "payload");
    }

    #[tokio::test]
    async fn test_skip_waiting_and_status() {
        let caches = Arc::new(CacheStorage::new());
        caches.open("hadith-net-v0");
        let base = spawn_proxy(Arc::new(FakeOrigin::default()), caches).await;
        let client = reqwest::Client::new();

        let status: Value = client
            .get(format!("{}/__worker/status", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(status["state"], "installed");

        let after: Value = client
            .post(format!("{}/__worker/skip-waiting", base))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(after["state"], "activated");
    }
}
