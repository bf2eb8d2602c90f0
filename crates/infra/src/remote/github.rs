//! GitHub contents API blob backend
//!
//! The whole snapshot is one JSON file in a repository. The file's blob
//! `sha` is the version token; GitHub rejects a write whose `sha` is stale
//! (409) or missing for an existing file (422).

use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Method, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize};
use timesheet_common::time::Clock;
use timesheet_core::RemoteAuthority;
use timesheet_domain::{
    GitHubConfig, Result, Snapshot, TimesheetError, VersionToken, VersionedSnapshot,
};
use tracing::{debug, info, instrument};

use super::errors::RemoteError;
use crate::http::HttpClient;

const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";

#[derive(Debug, Deserialize)]
struct ContentsFile {
    content: String,
    sha: String,
}

#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: String,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct PutResponse {
    content: Option<PutResponseContent>,
}

#[derive(Debug, Deserialize)]
struct PutResponseContent {
    sha: String,
}

/// [`RemoteAuthority`] storing the snapshot in a GitHub repository file.
pub struct GitHubBlobClient {
    http: HttpClient,
    config: GitHubConfig,
    clock: Arc<dyn Clock>,
}

impl GitHubBlobClient {
    pub fn new(config: GitHubConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        let http = HttpClient::builder()
            .timeout(config.timeout())
            .default_headers(headers)
            .build()?;
        Ok(Self::with_http(config, http, clock))
    }

    pub fn with_http(config: GitHubConfig, http: HttpClient, clock: Arc<dyn Clock>) -> Self {
        Self { http, config, clock }
    }

    fn api_base(&self) -> &str {
        self.config.api_base.trim_end_matches('/')
    }

    fn contents_url(&self) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base(),
            self.config.owner,
            self.config.repo,
            self.config.data_path.trim_start_matches('/')
        )
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.http
            .request(method, url)
            .bearer_auth(&self.config.token)
            .header(ACCEPT, GITHUB_ACCEPT)
    }

    fn commit_message(&self) -> String {
        let now = DateTime::<Utc>::from_timestamp_millis(self.clock.now_millis())
            .unwrap_or_default();
        format!("Update timesheet data - {}", now.to_rfc3339_opts(SecondsFormat::Millis, true))
    }
}

/// Decode a contents-API payload: base64 wrapped with newlines.
fn decode_content(content: &str) -> Result<Snapshot> {
    let compact: String = content.chars().filter(|c| !c.is_ascii_whitespace()).collect();
    let raw = STANDARD
        .decode(compact)
        .map_err(|err| TimesheetError::from(RemoteError::Decode(format!("base64: {err}"))))?;
    Ok(serde_json::from_slice(&raw)?)
}

fn encode_content(snapshot: &Snapshot) -> Result<String> {
    let pretty = serde_json::to_vec_pretty(snapshot)?;
    Ok(STANDARD.encode(pretty))
}

#[async_trait]
impl RemoteAuthority for GitHubBlobClient {
    fn backend(&self) -> &'static str {
        "github"
    }

    #[instrument(skip(self), fields(repo = %self.config.repo))]
    async fn health_check(&self) -> Result<()> {
        let url = format!("{}/repos/{}/{}", self.api_base(), self.config.owner, self.config.repo);
        let response = self.http.send(self.request(Method::GET, url)).await?;
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await.into());
        }
        debug!("repository reachable");
        Ok(())
    }

    #[instrument(skip(self), fields(path = %self.config.data_path))]
    async fn fetch_snapshot(&self) -> Result<Option<VersionedSnapshot>> {
        let request = self
            .request(Method::GET, self.contents_url())
            .query(&[("ref", &self.config.branch)]);
        let response = self.http.send(request).await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("data file does not exist yet");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RemoteError::from_response(response).await.into());
        }

        let file: ContentsFile = response
            .json()
            .await
            .map_err(|err| TimesheetError::from(RemoteError::Decode(err.to_string())))?;
        let snapshot = decode_content(&file.content)?;
        Ok(Some(VersionedSnapshot { snapshot, version: VersionToken::new(file.sha) }))
    }

    #[instrument(skip(self, snapshot, expected), fields(path = %self.config.data_path))]
    async fn write_snapshot(
        &self,
        snapshot: &Snapshot,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken> {
        let body = PutContents {
            message: self.commit_message(),
            content: encode_content(snapshot)?,
            branch: &self.config.branch,
            sha: expected.map(VersionToken::as_str),
        };

        let request = self.request(Method::PUT, self.contents_url()).json(&body);
        let response = self.http.send(request).await?;
        let status = response.status();
        if status == StatusCode::UNPROCESSABLE_ENTITY {
            let err = RemoteError::from_response(response).await;
            return Err(TimesheetError::Conflict(err.to_string()));
        }
        if !status.is_success() {
            return Err(RemoteError::from_response(response).await.into());
        }

        let written: PutResponse = response
            .json()
            .await
            .map_err(|err| TimesheetError::from(RemoteError::Decode(err.to_string())))?;
        let sha = written
            .content
            .map(|c| c.sha)
            .filter(|sha| !sha.is_empty())
            .ok_or_else(|| RemoteError::Decode("commit response carries no content sha".into()))?;

        info!(sha = %sha, "snapshot committed");
        Ok(VersionToken::new(sha))
    }
}
