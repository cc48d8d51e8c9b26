//! GitHub contents API client for the single managed file.
//!
//! Wraps `GET`/`PUT /repos/{owner}/{repo}/contents/{path}` with base64
//! encoding and the sha-conditional update that gives us optimistic
//! concurrency. No retries; a failed call surfaces immediately.

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::GithubConfig;
use crate::services::file_store::{CommitOutcome, FileStore, RemoteFile};

const API_VERSION: &str = "2022-11-28";

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    sha: &'a str,
}

#[derive(Debug, Deserialize)]
struct UpdateResponse {
    commit: CommitInfo,
}

#[derive(Debug, Deserialize)]
struct CommitInfo {
    sha: String,
}

#[derive(Clone)]
pub struct GitHubClient {
    client: Client,
    config: GithubConfig,
    token: String,
}

impl GitHubClient {
    pub fn new(config: GithubConfig, token: String) -> Result<Self> {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(u64::from(
                config.request_timeout_seconds,
            )))
            .user_agent("rostergate/0.1")
            .build()
            .context("Failed to build GitHub HTTP client")?;
        Ok(Self {
            client,
            config,
            token,
        })
    }

    fn contents_url(&self) -> String {
        // Encode each path segment but keep the separators.
        let path: Vec<String> = self
            .config
            .file_path
            .split('/')
            .map(|segment| urlencoding::encode(segment).into_owned())
            .collect();
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.config.api_base,
            self.config.owner,
            self.config.repo,
            path.join("/")
        )
    }

    fn request(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        builder
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    pub async fn get_file(&self) -> Result<RemoteFile> {
        let url = format!("{}?ref={}", self.contents_url(), self.config.branch);
        let response = self.request(self.client.get(&url)).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GitHub GET failed: {} - {}", status, body));
        }

        let response: ContentsResponse = response.json().await?;
        // GitHub wraps base64 content at 60 columns.
        let encoded: String = response.content.split_whitespace().collect();
        let bytes = BASE64
            .decode(encoded)
            .context("GitHub returned invalid base64 content")?;
        let content =
            String::from_utf8(bytes).context("Managed file content is not valid UTF-8")?;

        Ok(RemoteFile {
            content,
            sha: response.sha,
        })
    }

    pub async fn put_file(&self, content: &str, sha: &str, message: &str) -> Result<CommitOutcome> {
        let body = UpdateRequest {
            message,
            content: BASE64.encode(content.as_bytes()),
            branch: &self.config.branch,
            sha,
        };
        let response = self
            .request(self.client.put(self.contents_url()))
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("GitHub PUT failed: {} - {}", status, body));
        }

        let response: UpdateResponse = response.json().await?;
        Ok(CommitOutcome {
            commit_sha: response.commit.sha,
        })
    }
}

#[async_trait]
impl FileStore for GitHubClient {
    async fn fetch(&self) -> Result<RemoteFile> {
        self.get_file().await
    }

    async fn commit(&self, content: &str, sha: &str, message: &str) -> Result<CommitOutcome> {
        self.put_file(content, sha, message).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GithubConfig;

    fn client_for(file_path: &str) -> GitHubClient {
        let config = GithubConfig {
            file_path: file_path.to_string(),
            ..GithubConfig::default()
        };
        GitHubClient::new(config, "token".to_string()).unwrap()
    }

    #[test]
    fn test_contents_url_keeps_path_separators() {
        let client = client_for("netlify/functions/update-users.js");
        assert_eq!(
            client.contents_url(),
            "https://api.github.com/repos/example/site/contents/netlify/functions/update-users.js"
        );
    }

    #[test]
    fn test_contents_url_encodes_segments() {
        let client = client_for("my scripts/app.js");
        assert!(client.contents_url().ends_with("/contents/my%20scripts/app.js"));
    }
}
