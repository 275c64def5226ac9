//! Client for the Git-backed content repository, through the hosting
//! service's contents API.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::header::{ACCEPT, AUTHORIZATION, USER_AGENT};
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hadithnet_core::config::ContentRepo;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const CLIENT_AGENT: &str = concat!("hadithnet-server/", env!("CARGO_PKG_VERSION"));

/// A file read from the repository.
#[derive(Debug, Clone)]
pub struct RepoFile {
    pub content: String,
    /// Blob sha, required when committing a new version.
    pub sha: String,
}

#[derive(Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Serialize)]
struct UpdateFileRequest<'a> {
    message: &'a str,
    content: String,
    sha: &'a str,
    branch: &'a str,
}

#[derive(Deserialize)]
struct UpdateFileResponse {
    commit: CommitInfo,
}

#[derive(Deserialize)]
struct CommitInfo {
    sha: String,
}

#[derive(Clone)]
pub struct ContentRepoClient {
    client: Client,
    repo: ContentRepo,
    token: String,
}

impl ContentRepoClient {
    pub fn new(repo: ContentRepo, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .context("Failed to create content repository client")?;
        Ok(Self {
            client,
            repo,
            token,
        })
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.repo.api_url.trim_end_matches('/'),
            self.repo.owner,
            self.repo.repo,
            path
        )
    }

    fn authorized(&self, builder: RequestBuilder) -> RequestBuilder {
        builder
            .header(AUTHORIZATION, format!("token {}", self.token))
            .header(ACCEPT, ACCEPT_V3)
            .header(USER_AGENT, CLIENT_AGENT)
    }

    pub async fn get_file(&self, path: &str) -> Result<RepoFile> {
        let url = self.contents_url(path);
        debug!(path, "Fetching repository file");

        let response = self
            .authorized(self.client.get(&url))
            .send()
            .await
            .context("Failed to fetch file")?;
        let status = response.status();
        if !status.is_success() {
            bail!(
                "Failed to fetch file: {}",
                status.canonical_reason().unwrap_or(status.as_str())
            );
        }

        let file: ContentsResponse = response
            .json()
            .await
            .context("Failed to parse contents response")?;
        // Content arrives wrapped at 60 columns.
        let encoded: String = file.content.split_whitespace().collect();
        let bytes = STANDARD
            .decode(encoded)
            .context("Failed to decode file content")?;
        let content = String::from_utf8(bytes).context("File content is not UTF-8")?;

        Ok(RepoFile {
            content,
            sha: file.sha,
        })
    }

    /// Commit a new version of `path`. Returns the commit sha.
    pub async fn put_file(&self, path: &str, content: &str, sha: &str, message: &str) -> Result<String> {
        let url = self.contents_url(path);
        let body = UpdateFileRequest {
            message,
            content: STANDARD.encode(content),
            sha,
            branch: &self.repo.branch,
        };

        let response = self
            .authorized(self.client.put(&url))
            .json(&body)
            .send()
            .await
            .context("Failed to update file")?;
        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            bail!("Failed to update file: {}", error_body);
        }

        let result: UpdateFileResponse = response
            .json()
            .await
            .context("Failed to parse update response")?;
        info!(path, commit = %result.commit.sha, "Committed repository file");
        Ok(result.commit.sha)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contents_url() {
        let client = ContentRepoClient::new(ContentRepo::default(), "t".into()).unwrap();
        assert_eq!(
            client.contents_url("data/ara-bukhari.min.json"),
            "https://api.github.com/repos/adhilansari/hadithDb/contents/data/ara-bukhari.min.json"
        );
    }
}
