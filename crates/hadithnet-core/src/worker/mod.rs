//! Offline worker: the request-interception layer that keeps the reader
//! usable without a connection.
//!
//! The worker owns a set of versioned response caches and answers every
//! intercepted request with one of a few strategies, chosen by
//! [`OfflineWorker::classify`]. It never fails a request outright: when both
//! the cache and the network come up empty it synthesizes an error response.

mod network;
mod request;
mod storage;

pub use network::{is_hop_by_hop, HttpNetwork, Network};
pub use request::{Destination, RequestClass, RequestMode, WorkerRequest, WorkerResponse};
pub use storage::{CacheStorage, CachedResponse, ResponseCache};

use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

use reqwest::Url;
use tracing::{debug, info, warn};

/// Host serving the hadith dataset.
pub const DATASET_HOST: &str = "cdn.jsdelivr.net";

/// Application shell fetched during install.
pub const STATIC_ASSETS: &[&str] = &[
    "/",
    "/manifest.json",
    "/icons/icon-192x192.png",
    "/icons/icon-512x512.png",
];

const OFFLINE_PAGE: &str = include_str!("offline.html");

// ===== Cache names =====

/// Cache names for one worker generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheNames {
    pub shell: String,
    pub dataset: String,
    pub runtime: String,
}

impl CacheNames {
    pub fn for_version(version: &str) -> Self {
        Self {
            shell: format!("hadith-net-{}", version),
            dataset: format!("hadith-api-{}", version),
            runtime: format!("hadith-runtime-{}", version),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        name == self.shell || name == self.dataset || name == self.runtime
    }
}

// ===== Lifecycle =====

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    /// Installed and waiting for the previous generation to let go.
    Installed,
    Activating,
    Activated,
}

impl fmt::Display for WorkerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WorkerState::Installing => "installing",
            WorkerState::Installed => "installed",
            WorkerState::Activating => "activating",
            WorkerState::Activated => "activated",
        };
        f.write_str(s)
    }
}

/// Messages a page can post to the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerMessage {
    SkipWaiting,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct InstallReport {
    pub cached: Vec<String>,
    pub failed: Vec<String>,
}

struct Lifecycle {
    state: WorkerState,
    skip_waiting: bool,
}

// ===== Worker =====

pub struct OfflineWorker<N> {
    network: Arc<N>,
    caches: Arc<CacheStorage>,
    names: CacheNames,
    origin: Url,
    lifecycle: Mutex<Lifecycle>,
}

impl<N: Network> OfflineWorker<N> {
    /// Create a worker for `origin` whose caches are tagged with `version`.
    pub fn new(network: N, caches: Arc<CacheStorage>, origin: Url, version: &str) -> Self {
        Self {
            network: Arc::new(network),
            caches,
            names: CacheNames::for_version(version),
            origin,
            lifecycle: Mutex::new(Lifecycle {
                state: WorkerState::Installing,
                skip_waiting: false,
            }),
        }
    }

    pub fn cache_names(&self) -> &CacheNames {
        &self.names
    }

    pub fn caches(&self) -> &CacheStorage {
        &self.caches
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn state(&self) -> WorkerState {
        self.lifecycle().state
    }

    fn lifecycle(&self) -> MutexGuard<'_, Lifecycle> {
        self.lifecycle.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn set_state(&self, state: WorkerState) {
        self.lifecycle().state = state;
        debug!(%state, "Worker state changed");
    }

    /// Install, then activate straight away unless another generation's
    /// caches are still present. In that case the worker waits for
    /// [`WorkerMessage::SkipWaiting`].
    pub async fn register(&self) -> InstallReport {
        let report = self.install().await;
        let previous_generation = self
            .caches
            .keys()
            .iter()
            .any(|name| name.starts_with("hadith-") && !self.names.contains(name));
        let skip_waiting = self.lifecycle().skip_waiting;

        if !previous_generation || skip_waiting {
            self.activate();
        } else {
            info!("Previous worker caches present, waiting for skip-waiting");
        }
        report
    }

    /// Precache the application shell. Each asset is fetched on its own so
    /// one missing file does not abort the rest.
    pub async fn install(&self) -> InstallReport {
        self.set_state(WorkerState::Installing);
        self.caches.open(&self.names.shell);

        let mut report = InstallReport::default();
        for path in STATIC_ASSETS {
            let url = match self.origin.join(path) {
                Ok(url) => url,
                Err(e) => {
                    warn!(path, error = %e, "Invalid static asset path");
                    report.failed.push(path.to_string());
                    continue;
                }
            };
            let request = WorkerRequest::get(url);
            match self.network.fetch(&request).await {
                Ok(response) if response.is_cacheable() => {
                    self.caches
                        .put(&self.names.shell, request.cache_key(), response);
                    report.cached.push(path.to_string());
                }
                Ok(response) => {
                    warn!(path, status = response.status, "Static asset not cached");
                    report.failed.push(path.to_string());
                }
                Err(e) => {
                    warn!(path, error = %e, "Failed to precache static asset");
                    report.failed.push(path.to_string());
                }
            }
        }

        self.set_state(WorkerState::Installed);
        info!(
            cached = report.cached.len(),
            failed = report.failed.len(),
            "Worker installed"
        );
        report
    }

    /// Delete every cache that does not belong to this generation and take
    /// control. Returns the deleted cache names.
    pub fn activate(&self) -> Vec<String> {
        self.set_state(WorkerState::Activating);

        let mut deleted = Vec::new();
        for name in self.caches.keys() {
            if !self.names.contains(&name) && self.caches.delete(&name) {
                info!(cache = %name, "Deleted stale cache");
                deleted.push(name);
            }
        }

        self.set_state(WorkerState::Activated);
        deleted
    }

    /// Handle a message posted by a page. Returns the state afterwards.
    pub fn post_message(&self, message: WorkerMessage) -> WorkerState {
        match message {
            WorkerMessage::SkipWaiting => {
                let state = {
                    let mut lifecycle = self.lifecycle();
                    lifecycle.skip_waiting = true;
                    lifecycle.state
                };
                if state == WorkerState::Installed {
                    self.activate();
                }
            }
        }
        self.state()
    }

    /// Pick the strategy for a request.
    pub fn classify(&self, request: &WorkerRequest) -> RequestClass {
        if !request.is_get() {
            return RequestClass::Passthrough;
        }
        if request.url.host_str() == Some(DATASET_HOST) {
            return RequestClass::Dataset;
        }
        if request.url.origin() != self.origin.origin() {
            return RequestClass::Passthrough;
        }
        if request.is_navigation() {
            return RequestClass::Navigation;
        }
        match request.destination {
            Destination::Image | Destination::Font | Destination::Manifest => {
                RequestClass::StaticAsset
            }
            Destination::Script | Destination::Style => RequestClass::Subresource,
            Destination::Document | Destination::Empty => {
                let path = request.url.path();
                if STATIC_ASSETS.contains(&path) || path.starts_with("/icons/") {
                    RequestClass::StaticAsset
                } else {
                    RequestClass::Passthrough
                }
            }
        }
    }

    /// Answer an intercepted request. Always produces a response.
    ///
    /// Until the worker is activated it does not control any page, so
    /// requests go straight to the network.
    pub async fn handle_fetch(&self, request: WorkerRequest) -> WorkerResponse {
        if self.state() != WorkerState::Activated {
            return self.network_only(&request).await;
        }

        let class = self.classify(&request);
        debug!(url = %request.url, ?class, "Handling fetch");
        match class {
            RequestClass::Dataset => self.dataset(request).await,
            RequestClass::Navigation => self.navigation(&request).await,
            RequestClass::StaticAsset => {
                self.cache_first(&request, &self.names.shell, WorkerResponse::new(404, Vec::new()))
                    .await
            }
            RequestClass::Subresource => {
                self.cache_first(&request, &self.names.runtime, unavailable())
                    .await
            }
            RequestClass::Passthrough => self.network_only(&request).await,
        }
    }

    // ===== Strategies =====

    async fn network_only(&self, request: &WorkerRequest) -> WorkerResponse {
        match self.network.fetch(request).await {
            Ok(response) => response,
            Err(e) => {
                debug!(url = %request.url, error = %e, "Network unavailable");
                unavailable()
            }
        }
    }

    /// Serve the cached copy and refresh it in the background. Without a
    /// cached copy, wait for the network.
    async fn dataset(&self, request: WorkerRequest) -> WorkerResponse {
        let cache_name = self.names.dataset.clone();

        if let Some(cached) = self.caches.match_in(&cache_name, request.cache_key()) {
            debug!(url = %request.url, "Dataset served from cache");
            let network = Arc::clone(&self.network);
            let caches = Arc::clone(&self.caches);
            tokio::spawn(async move {
                match network.fetch(&request).await {
                    Ok(fresh) if fresh.is_cacheable() => {
                        caches.put(&cache_name, request.cache_key(), fresh);
                        debug!(url = %request.url, "Dataset cache refreshed");
                    }
                    Ok(fresh) => {
                        debug!(url = %request.url, status = fresh.status, "Refresh not cached")
                    }
                    Err(e) => warn!(url = %request.url, error = %e, "Background refresh failed"),
                }
            });
            return cached;
        }

        match self.network.fetch(&request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.caches
                        .put(&cache_name, request.cache_key(), response.clone());
                }
                response
            }
            Err(e) => {
                warn!(url = %request.url, error = %e, "Dataset unavailable offline");
                unavailable()
            }
        }
    }

    /// Prefer the live page; fall back to the cached page, then the cached
    /// root, then the built-in offline page.
    async fn navigation(&self, request: &WorkerRequest) -> WorkerResponse {
        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.caches
                        .put(&self.names.runtime, request.cache_key(), response.clone());
                }
                response
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Navigation offline, using cache");
                let cache_order = [self.names.runtime.as_str(), self.names.shell.as_str()];
                if let Some(cached) = self.caches.match_any(&cache_order, request.cache_key()) {
                    return cached;
                }
                let root = self.origin.join("/").ok();
                if let Some(cached) = root
                    .as_ref()
                    .and_then(|root| self.caches.match_any(&cache_order, root.as_str()))
                {
                    return cached;
                }
                WorkerResponse::html(503, OFFLINE_PAGE)
            }
        }
    }

    async fn cache_first(
        &self,
        request: &WorkerRequest,
        store_in: &str,
        fallback: WorkerResponse,
    ) -> WorkerResponse {
        let cache_order = [
            self.names.shell.as_str(),
            self.names.runtime.as_str(),
        ];
        if let Some(cached) = self.caches.match_any(&cache_order, request.cache_key()) {
            return cached;
        }

        match self.network.fetch(request).await {
            Ok(response) => {
                if response.is_cacheable() {
                    self.caches
                        .put(store_in, request.cache_key(), response.clone());
                }
                response
            }
            Err(e) => {
                debug!(url = %request.url, error = %e, "Asset unavailable offline");
                fallback
            }
        }
    }
}

fn unavailable() -> WorkerResponse {
    WorkerResponse::json(503, &serde_json::json!({ "error": "Network unavailable" }))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;

    const ORIGIN: &str = "http://localhost:3000";
    const DATASET_URL: &str =
        "https://cdn.jsdelivr.net/gh/adhilansari/hadithDb/editions.min.json";

    /// Network with canned responses that can be switched off.
    #[derive(Default)]
    struct FakeNetwork {
        responses: Mutex<HashMap<String, WorkerResponse>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeNetwork {
        fn serve(&self, url: &str, status: u16, body: &str) {
            self.responses
                .lock()
                .unwrap()
                .insert(url.to_string(), WorkerResponse::new(status, body.as_bytes().to_vec()));
        }
    }

    impl Network for Arc<FakeNetwork> {
        async fn fetch(&self, request: &WorkerRequest) -> anyhow::Result<WorkerResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                anyhow::bail!("offline");
            }
            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(request.url.as_str())
                .cloned()
                .unwrap_or_else(|| WorkerResponse::new(404, Vec::new())))
        }
    }

    fn url(path: &str) -> Url {
        format!("{}{}", ORIGIN, path).parse().unwrap()
    }

    fn shell_network() -> Arc<FakeNetwork> {
        let network = Arc::new(FakeNetwork::default());
        network.serve(&url("/").to_string(), 200, "<html>home</html>");
        network.serve(&url("/manifest.json").to_string(), 200, "{}");
        network.serve(&url("/icons/icon-192x192.png").to_string(), 200, "png");
        network.serve(&url("/icons/icon-512x512.png").to_string(), 200, "png");
        network
    }

    async fn active_worker(network: Arc<FakeNetwork>) -> OfflineWorker<Arc<FakeNetwork>> {
        let worker = OfflineWorker::new(
            network,
            Arc::new(CacheStorage::new()),
            ORIGIN.parse().unwrap(),
            "v1",
        );
        worker.register().await;
        assert_eq!(worker.state(), WorkerState::Activated);
        worker
    }

    #[tokio::test]
    async fn test_install_tolerates_missing_asset() {
        let network = shell_network();
        network.responses.lock().unwrap().remove(url("/icons/icon-512x512.png").as_str());
        let worker = OfflineWorker::new(
            network,
            Arc::new(CacheStorage::new()),
            ORIGIN.parse().unwrap(),
            "v1",
        );

        let report = worker.install().await;
        assert_eq!(report.cached.len(), 3);
        assert_eq!(report.failed, vec!["/icons/icon-512x512.png"]);
        assert_eq!(worker.state(), WorkerState::Installed);
        assert!(worker
            .caches()
            .match_in("hadith-net-v1", url("/").as_str())
            .is_some());
    }

    #[tokio::test]
    async fn test_activate_deletes_stale_caches() {
        let caches = Arc::new(CacheStorage::new());
        for name in ["hadith-net-v1", "hadith-net-v0", "random-other"] {
            caches.open(name);
        }
        let worker = OfflineWorker::new(shell_network(), caches, ORIGIN.parse().unwrap(), "v1");

        let mut deleted = worker.activate();
        deleted.sort();
        assert_eq!(deleted, vec!["hadith-net-v0", "random-other"]);
        assert_eq!(worker.caches().keys(), vec!["hadith-net-v1"]);
        assert_eq!(worker.state(), WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_waits_for_skip_waiting_when_previous_generation_present() {
        let caches = Arc::new(CacheStorage::new());
        caches.open("hadith-net-v0");
        let worker = OfflineWorker::new(shell_network(), caches, ORIGIN.parse().unwrap(), "v1");

        worker.register().await;
        assert_eq!(worker.state(), WorkerState::Installed);

        assert_eq!(
            worker.post_message(WorkerMessage::SkipWaiting),
            WorkerState::Activated
        );
        assert!(!worker.caches().has("hadith-net-v0"));
    }

    #[tokio::test]
    async fn test_restart_serves_persisted_caches_offline() {
        let tmp = tempfile::tempdir().unwrap();
        let network = shell_network();
        network.serve(url("/book/muslim").as_str(), 200, "<html>muslim</html>");
        {
            let caches = Arc::new(CacheStorage::persistent(tmp.path().to_path_buf()).unwrap());
            let worker =
                OfflineWorker::new(Arc::clone(&network), caches, ORIGIN.parse().unwrap(), "v1");
            worker.register().await;
            worker
                .handle_fetch(WorkerRequest::get(url("/book/muslim")).navigate())
                .await;
        }

        network.offline.store(true, Ordering::SeqCst);
        let caches = Arc::new(CacheStorage::persistent(tmp.path().to_path_buf()).unwrap());
        let worker = OfflineWorker::new(Arc::clone(&network), caches, ORIGIN.parse().unwrap(), "v1");
        worker.register().await;
        assert_eq!(worker.state(), WorkerState::Activated);

        let response = worker
            .handle_fetch(WorkerRequest::get(url("/book/muslim")).navigate())
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<html>muslim</html>");
    }

    #[tokio::test]
    async fn test_restart_with_new_version_replaces_persisted_caches() {
        let tmp = tempfile::tempdir().unwrap();
        {
            let caches = Arc::new(CacheStorage::persistent(tmp.path().to_path_buf()).unwrap());
            let worker = OfflineWorker::new(shell_network(), caches, ORIGIN.parse().unwrap(), "v1");
            worker.register().await;
        }

        let caches = Arc::new(CacheStorage::persistent(tmp.path().to_path_buf()).unwrap());
        let worker = OfflineWorker::new(shell_network(), caches, ORIGIN.parse().unwrap(), "v2");
        worker.register().await;
        assert_eq!(worker.state(), WorkerState::Installed);
        assert!(worker.caches().has("hadith-net-v1"));

        worker.post_message(WorkerMessage::SkipWaiting);
        assert_eq!(worker.state(), WorkerState::Activated);

        let reopened = CacheStorage::persistent(tmp.path().to_path_buf()).unwrap();
        assert_eq!(reopened.keys(), vec!["hadith-net-v2"]);
    }

    #[tokio::test]
    async fn test_classify() {
        let worker = active_worker(shell_network()).await;
        let dataset = WorkerRequest::get(DATASET_URL.parse().unwrap());
        assert_eq!(worker.classify(&dataset), RequestClass::Dataset);

        let page = WorkerRequest::get(url("/book/bukhari")).navigate();
        assert_eq!(worker.classify(&page), RequestClass::Navigation);

        let icon = WorkerRequest::get(url("/icons/icon-192x192.png"));
        assert_eq!(worker.classify(&icon), RequestClass::StaticAsset);

        let script = WorkerRequest::get(url("/assets/app.js")).with_destination(Destination::Script);
        assert_eq!(worker.classify(&script), RequestClass::Subresource);

        let api = WorkerRequest::get(url("/api/editions"));
        assert_eq!(worker.classify(&api), RequestClass::Passthrough);

        let mut post = WorkerRequest::get(DATASET_URL.parse().unwrap());
        post.method = "POST".to_string();
        assert_eq!(worker.classify(&post), RequestClass::Passthrough);

        let other = WorkerRequest::get("https://example.com/".parse().unwrap()).navigate();
        assert_eq!(worker.classify(&other), RequestClass::Passthrough);
    }

    #[tokio::test]
    async fn test_offline_navigation_falls_back_to_cached_root() {
        let network = shell_network();
        let worker = active_worker(Arc::clone(&network)).await;
        network.offline.store(true, Ordering::SeqCst);

        let response = worker
            .handle_fetch(WorkerRequest::get(url("/book/bukhari")).navigate())
            .await;
        assert_eq!(response.status, 200);
        assert_eq!(response.body, b"<html>home</html>");
    }

    #[tokio::test]
    async fn test_offline_navigation_prefers_exact_cached_page() {
        let network = shell_network();
        network.serve(url("/book/muslim").as_str(), 200, "<html>muslim</html>");
        let worker = active_worker(Arc::clone(&network)).await;

        let online = worker
            .handle_fetch(WorkerRequest::get(url("/book/muslim")).navigate())
            .await;
        assert_eq!(online.body, b"<html>muslim</html>");

        network.offline.store(true, Ordering::SeqCst);
        let offline = worker
            .handle_fetch(WorkerRequest::get(url("/book/muslim")).navigate())
            .await;
        assert_eq!(offline.body, b"<html>muslim</html>");
    }

    #[tokio::test]
    async fn test_offline_page_without_any_cache() {
        let network = Arc::new(FakeNetwork::default());
        let worker = active_worker(Arc::clone(&network)).await;
        network.offline.store(true, Ordering::SeqCst);

        let response = worker
            .handle_fetch(WorkerRequest::get(url("/")).navigate())
            .await;
        assert_eq!(response.status, 503);
        assert_eq!(response.content_type(), Some("text/html; charset=utf-8"));
        assert!(String::from_utf8_lossy(&response.body).contains("Retry"));
    }

    #[tokio::test]
    async fn test_dataset_offline_returns_503_json() {
        let network = shell_network();
        let worker = active_worker(Arc::clone(&network)).await;
        network.offline.store(true, Ordering::SeqCst);

        let response = worker
            .handle_fetch(WorkerRequest::get(DATASET_URL.parse().unwrap()))
            .await;
        assert_eq!(response.status, 503);
        let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["error"], "Network unavailable");
    }

    #[tokio::test]
    async fn test_dataset_cache_first_with_background_refresh() {
        let network = shell_network();
        network.serve(DATASET_URL, 200, "old");
        let worker = active_worker(Arc::clone(&network)).await;
        let request = || WorkerRequest::get(DATASET_URL.parse().unwrap());

        assert_eq!(worker.handle_fetch(request()).await.body, b"old");

        network.serve(DATASET_URL, 200, "new");
        // Cached copy first, refreshed behind the scenes.
        assert_eq!(worker.handle_fetch(request()).await.body, b"old");
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(worker.handle_fetch(request()).await.body, b"new");
    }

    #[tokio::test]
    async fn test_only_ok_responses_are_cached() {
        let network = shell_network();
        network.serve(DATASET_URL, 500, "boom");
        let worker = active_worker(Arc::clone(&network)).await;

        let response = worker
            .handle_fetch(WorkerRequest::get(DATASET_URL.parse().unwrap()))
            .await;
        assert_eq!(response.status, 500);
        assert!(worker.caches().match_in("hadith-api-v1", DATASET_URL).is_none());
    }

    #[tokio::test]
    async fn test_static_asset_served_from_cache_offline() {
        let network = shell_network();
        let worker = active_worker(Arc::clone(&network)).await;
        network.offline.store(true, Ordering::SeqCst);

        let icon = worker
            .handle_fetch(
                WorkerRequest::get(url("/icons/icon-192x192.png"))
                    .with_destination(Destination::Image),
            )
            .await;
        assert_eq!(icon.status, 200);

        let missing = worker
            .handle_fetch(
                WorkerRequest::get(url("/icons/other.png")).with_destination(Destination::Image),
            )
            .await;
        assert_eq!(missing.status, 404);
    }

    #[tokio::test]
    async fn test_subresource_cached_after_first_load() {
        let network = shell_network();
        network.serve(url("/assets/app.css").as_str(), 200, "body{}");
        let worker = active_worker(Arc::clone(&network)).await;
        let request =
            || WorkerRequest::get(url("/assets/app.css")).with_destination(Destination::Style);

        assert_eq!(worker.handle_fetch(request()).await.status, 200);
        let calls = network.calls.load(Ordering::SeqCst);
        assert_eq!(worker.handle_fetch(request()).await.body, b"body{}");
        assert_eq!(network.calls.load(Ordering::SeqCst), calls);

        network.offline.store(true, Ordering::SeqCst);
        let uncached = worker
            .handle_fetch(
                WorkerRequest::get(url("/assets/other.js")).with_destination(Destination::Script),
            )
            .await;
        assert_eq!(uncached.status, 503);
    }

    #[tokio::test]
    async fn test_uncontrolled_requests_go_to_network() {
        let network = shell_network();
        network.serve(DATASET_URL, 200, "live");
        let worker = OfflineWorker::new(
            Arc::clone(&network),
            Arc::new(CacheStorage::new()),
            ORIGIN.parse().unwrap(),
            "v1",
        );

        let response = worker
            .handle_fetch(WorkerRequest::get(DATASET_URL.parse().unwrap()))
            .await;
        assert_eq!(response.body, b"live");
        assert!(worker.caches().match_in("hadith-api-v1", DATASET_URL).is_none());
    }
}
