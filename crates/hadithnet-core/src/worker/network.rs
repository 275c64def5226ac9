//! Network access for the offline worker.

use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::header::{HeaderName, HeaderValue};
use reqwest::{Client, Method};
use tracing::debug;

use super::{WorkerRequest, WorkerResponse};

const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Headers that describe a single connection and must not be forwarded.
const HOP_BY_HOP: &[&str] = &[
    "connection",
    "content-length",
    "host",
    "keep-alive",
    "proxy-connection",
    "te",
    "trailer",
    "transfer-encoding",
    "upgrade",
];

pub fn is_hop_by_hop(name: &str) -> bool {
    HOP_BY_HOP.iter().any(|h| h.eq_ignore_ascii_case(name))
}

/// Source of live responses.
///
/// An `Err` means the network could not be reached at all. Any HTTP response,
/// including error statuses, is an `Ok`.
pub trait Network: Send + Sync + 'static {
    fn fetch(&self, request: &WorkerRequest) -> impl Future<Output = Result<WorkerResponse>> + Send;
}

/// `Network` over reqwest.
#[derive(Clone)]
pub struct HttpNetwork {
    client: Client,
}

impl HttpNetwork {
    pub fn new() -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .context("Failed to create HTTP client")?;
        Ok(Self { client })
    }
}

impl Network for HttpNetwork {
    async fn fetch(&self, request: &WorkerRequest) -> Result<WorkerResponse> {
        let method = Method::from_bytes(request.method.as_bytes())
            .with_context(|| format!("Invalid method {}", request.method))?;

        let mut builder = self.client.request(method, request.url.clone());
        for (name, value) in &request.headers {
            if is_hop_by_hop(name) {
                continue;
            }
            let (Ok(name), Ok(value)) = (
                HeaderName::from_bytes(name.as_bytes()),
                HeaderValue::from_str(value),
            ) else {
                continue;
            };
            builder = builder.header(name, value);
        }
        if !request.body.is_empty() {
            builder = builder.body(request.body.clone());
        }

        let response = builder
            .send()
            .await
            .with_context(|| format!("Failed to fetch {}", request.url))?;

        let status = response.status().as_u16();
        let mut headers = std::collections::BTreeMap::new();
        for (name, value) in response.headers() {
            if is_hop_by_hop(name.as_str()) {
                continue;
            }
            if let Ok(value) = value.to_str() {
                headers.insert(name.as_str().to_string(), value.to_string());
            }
        }
        let body = response
            .bytes()
            .await
            .with_context(|| format!("Failed to read body of {}", request.url))?
            .to_vec();

        debug!(url = %request.url, status, bytes = body.len(), "Network response");
        Ok(WorkerResponse {
            status,
            headers,
            body,
        })
    }
}
