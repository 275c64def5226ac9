//! Requests and responses as seen by the offline worker.

use std::collections::BTreeMap;

use reqwest::Url;
use serde::{Deserialize, Serialize};

/// What the request is for, as reported by `Sec-Fetch-Dest`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Destination {
    Document,
    Script,
    Style,
    Image,
    Font,
    Manifest,
    #[default]
    Empty,
}

impl Destination {
    pub fn from_fetch_dest(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "document" | "iframe" | "frame" => Destination::Document,
            "script" | "worker" | "sharedworker" | "serviceworker" => Destination::Script,
            "style" => Destination::Style,
            "image" => Destination::Image,
            "font" => Destination::Font,
            "manifest" => Destination::Manifest,
            _ => Destination::Empty,
        }
    }
}

/// Request mode, as reported by `Sec-Fetch-Mode`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    Navigate,
    Cors,
    NoCors,
    #[default]
    SameOrigin,
}

impl RequestMode {
    pub fn from_fetch_mode(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "navigate" => RequestMode::Navigate,
            "cors" => RequestMode::Cors,
            "no-cors" => RequestMode::NoCors,
            _ => RequestMode::SameOrigin,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WorkerRequest {
    pub method: String,
    pub url: Url,
    pub destination: Destination,
    pub mode: RequestMode,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
}

impl WorkerRequest {
    pub fn get(url: Url) -> Self {
        Self {
            method: "GET".to_string(),
            url,
            destination: Destination::Empty,
            mode: RequestMode::SameOrigin,
            headers: BTreeMap::new(),
            body: Vec::new(),
        }
    }

    pub fn with_destination(mut self, destination: Destination) -> Self {
        self.destination = destination;
        self
    }

    /// Mark as a top-level page load.
    pub fn navigate(mut self) -> Self {
        self.mode = RequestMode::Navigate;
        self.destination = Destination::Document;
        self
    }

    pub fn is_get(&self) -> bool {
        self.method.eq_ignore_ascii_case("GET")
    }

    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate || self.destination == Destination::Document
    }

    /// Key used for cache lookups.
    pub fn cache_key(&self) -> &str {
        self.url.as_str()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    #[serde(with = "body_hex")]
    pub body: Vec<u8>,
}

/// Bodies are stored as hex strings rather than JSON number arrays.
mod body_hex {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        hex::decode(encoded).map_err(serde::de::Error::custom)
    }
}

impl WorkerResponse {
    pub fn new(status: u16, body: Vec<u8>) -> Self {
        Self {
            status,
            headers: BTreeMap::new(),
            body,
        }
    }

    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        let body = serde_json::to_vec(value).unwrap_or_default();
        Self::new(status, body).with_header("content-type", "application/json")
    }

    pub fn html(status: u16, page: &str) -> Self {
        Self::new(status, page.as_bytes().to_vec())
            .with_header("content-type", "text/html; charset=utf-8")
    }

    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers.get("content-type").map(String::as_str)
    }

    /// Only complete, successful responses are worth keeping.
    pub fn is_cacheable(&self) -> bool {
        self.status == 200
    }
}

/// How the worker treats a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestClass {
    /// Hadith dataset on the CDN: cache first, refreshed in the background.
    Dataset,
    /// Page load: network first, cached page when offline.
    Navigation,
    /// Icons, manifest and other static files: cache first.
    StaticAsset,
    /// Scripts and stylesheets: cache first.
    Subresource,
    /// Everything else goes straight to the network.
    Passthrough,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fetch_metadata_parsing() {
        assert_eq!(Destination::from_fetch_dest("document"), Destination::Document);
        assert_eq!(Destination::from_fetch_dest("Style"), Destination::Style);
        assert_eq!(Destination::from_fetch_dest("audio"), Destination::Empty);
        assert_eq!(RequestMode::from_fetch_mode("navigate"), RequestMode::Navigate);
        assert_eq!(RequestMode::from_fetch_mode("no-cors"), RequestMode::NoCors);
        assert_eq!(RequestMode::from_fetch_mode(""), RequestMode::SameOrigin);
    }

    #[test]
    fn test_navigation_detection() {
        let url: Url = "http://localhost/books".parse().unwrap();
        assert!(WorkerRequest::get(url.clone()).navigate().is_navigation());
        assert!(WorkerRequest::get(url.clone())
            .with_destination(Destination::Document)
            .is_navigation());
        assert!(!WorkerRequest::get(url).is_navigation());
    }

    #[test]
    fn test_json_response() {
        let response =
            WorkerResponse::json(503, &serde_json::json!({"error": "Network unavailable"}));
        assert_eq!(response.status, 503);
        assert_eq!(response.content_type(), Some("application/json"));
        assert_eq!(response.body, br#"{"error":"Network unavailable"}"#);
        assert!(!response.is_cacheable());
    }
}
