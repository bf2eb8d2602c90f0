//! REST CRUD backend
//!
//! Talks to the timesheet API server (`/projects`, `/entries`, `/health`).
//! The server has no document version, so the snapshot contract is derived:
//! the version token is a BLAKE3 hash of the sorted record lists and a
//! snapshot write is applied as a record diff after checking that hash.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use timesheet_common::time::Clock;
use timesheet_core::{RecordRemote, RemoteAuthority};
use timesheet_domain::{
    EntryFilter, Project, ProjectPatch, RestConfig, Result, Snapshot, TimeEntry, TimeEntryPatch,
    TimesheetError, VersionToken, VersionedSnapshot,
};
use tracing::{debug, info, instrument};
use url::Url;
use uuid::Uuid;

use super::errors::RemoteError;
use crate::http::HttpClient;

/// [`RecordRemote`] over the REST API.
pub struct RestRecordClient {
    http: HttpClient,
    base_url: String,
    token: Option<String>,
    clock: Arc<dyn Clock>,
}

impl RestRecordClient {
    pub fn new(config: &RestConfig, clock: Arc<dyn Clock>) -> Result<Self> {
        let http = HttpClient::builder().timeout(config.timeout()).build()?;
        Self::with_http(config, http, clock)
    }

    /// Use a preconfigured [`HttpClient`] (retry policy, headers).
    pub fn with_http(config: &RestConfig, http: HttpClient, clock: Arc<dyn Clock>) -> Result<Self> {
        let parsed = Url::parse(&config.base_url).map_err(|err| {
            TimesheetError::Config(format!("invalid API url '{}': {err}", config.base_url))
        })?;
        Ok(Self {
            http,
            base_url: parsed.as_str().trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            clock,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn get_project(&self, id: Uuid) -> Result<Project> {
        self.fetch(self.request(Method::GET, &format!("/projects/{id}"))).await
    }

    async fn get_entry(&self, id: Uuid) -> Result<TimeEntry> {
        self.fetch(self.request(Method::GET, &format!("/entries/{id}"))).await
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, format!("{}{path}", self.base_url));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let response = self.http.send(builder).await?;
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(RemoteError::from_response(response).await.into())
        }
    }

    async fn fetch<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let response = self.send(builder).await?;
        let bytes = response
            .bytes()
            .await
            .map_err(|err| TimesheetError::from(RemoteError::Network(err.to_string())))?;
        serde_json::from_slice(&bytes)
            .map_err(|err| RemoteError::Decode(err.to_string()).into())
    }

    /// PUT a partial body. The server echoes `{id, ..body}`, so a partial
    /// echo is completed with a GET.
    async fn put<T, B>(&self, path: &str, body: &B) -> Result<Option<T>>
    where
        T: DeserializeOwned,
        B: Serialize + Sync,
    {
        let echoed: serde_json::Value =
            self.fetch(self.request(Method::PUT, path).json(body)).await?;
        Ok(serde_json::from_value(echoed).ok())
    }

    async fn list_all(&self) -> Result<(Vec<Project>, Vec<TimeEntry>)> {
        let filter = EntryFilter::default();
        futures::try_join!(self.list_projects(), self.list_entries(&filter))
    }

    /// Apply the difference between the remote lists and `target`.
    async fn apply_diff(
        &self,
        remote_projects: &[Project],
        remote_entries: &[TimeEntry],
        target: &Snapshot,
    ) -> Result<DiffStats> {
        let mut stats = DiffStats::default();
        let projects: HashMap<Uuid, &Project> = remote_projects.iter().map(|p| (p.id, p)).collect();
        let entries: HashMap<Uuid, &TimeEntry> = remote_entries.iter().map(|e| (e.id, e)).collect();

        for project in &target.projects {
            match projects.get(&project.id) {
                None => {
                    self.create_project(project).await?;
                    stats.created += 1;
                }
                Some(existing) if *existing != project => {
                    let patch = ProjectPatch::default().name(&project.name).color(&project.color);
                    self.update_project(project.id, &patch).await?;
                    stats.updated += 1;
                }
                Some(_) => {}
            }
        }

        for entry in &target.entries {
            match entries.get(&entry.id) {
                None => {
                    self.create_entry(entry).await?;
                    stats.created += 1;
                }
                Some(existing) if *existing != entry => {
                    self.put::<TimeEntry, _>(&format!("/entries/{}", entry.id), entry).await?;
                    stats.updated += 1;
                }
                Some(_) => {}
            }
        }

        let kept_entries: HashSet<Uuid> = target.entries.iter().map(|e| e.id).collect();
        let kept_projects: HashSet<Uuid> = target.projects.iter().map(|p| p.id).collect();

        for entry in remote_entries {
            let cascaded = !kept_projects.contains(&entry.project_id);
            if !kept_entries.contains(&entry.id) && !cascaded {
                self.delete_entry(entry.id).await?;
                stats.deleted += 1;
            }
        }
        for project in remote_projects {
            if !kept_projects.contains(&project.id) {
                self.delete_project(project.id).await?;
                stats.deleted += 1;
            }
        }

        Ok(stats)
    }
}

#[derive(Debug, Default)]
struct DiffStats {
    created: usize,
    updated: usize,
    deleted: usize,
}

/// Version token for a record set: BLAKE3 over the id-sorted lists.
pub fn content_version(projects: &[Project], entries: &[TimeEntry]) -> Result<VersionToken> {
    let mut projects: Vec<&Project> = projects.iter().collect();
    let mut entries: Vec<&TimeEntry> = entries.iter().collect();
    projects.sort_by_key(|p| p.id);
    entries.sort_by_key(|e| e.id);

    let canonical = serde_json::to_vec(&(projects, entries))?;
    Ok(VersionToken::new(hex::encode(blake3::hash(&canonical).as_bytes())))
}

#[async_trait]
impl RemoteAuthority for RestRecordClient {
    fn backend(&self) -> &'static str {
        "rest"
    }

    #[instrument(skip(self), fields(base_url = %self.base_url))]
    async fn health_check(&self) -> Result<()> {
        self.send(self.request(Method::GET, "/health")).await?;
        debug!("api server healthy");
        Ok(())
    }

    async fn fetch_snapshot(&self) -> Result<Option<VersionedSnapshot>> {
        let (projects, entries) = self.list_all().await?;
        if projects.is_empty() && entries.is_empty() {
            return Ok(None);
        }
        let version = content_version(&projects, &entries)?;
        let last_modified = self.clock.now_millis();
        Ok(Some(VersionedSnapshot {
            snapshot: Snapshot { projects, entries, last_modified },
            version,
        }))
    }

    #[instrument(skip(self, snapshot, expected), fields(base_url = %self.base_url))]
    async fn write_snapshot(
        &self,
        snapshot: &Snapshot,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken> {
        let (projects, entries) = self.list_all().await?;
        let current = if projects.is_empty() && entries.is_empty() {
            None
        } else {
            Some(content_version(&projects, &entries)?)
        };

        if current.as_ref() != expected {
            return Err(TimesheetError::Conflict(format!(
                "remote records changed (expected {}, found {})",
                expected.map_or("none", VersionToken::as_str),
                current.as_ref().map_or("none", VersionToken::as_str)
            )));
        }

        let stats = self.apply_diff(&projects, &entries, snapshot).await?;
        info!(
            created = stats.created,
            updated = stats.updated,
            deleted = stats.deleted,
            "snapshot applied as record diff"
        );
        content_version(&snapshot.projects, &snapshot.entries)
    }
}

#[async_trait]
impl RecordRemote for RestRecordClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        self.fetch(self.request(Method::GET, "/projects")).await
    }

    async fn list_entries(&self, filter: &EntryFilter) -> Result<Vec<TimeEntry>> {
        let pairs = filter.query_pairs();
        self.fetch(self.request(Method::GET, "/entries").query(&pairs)).await
    }

    #[instrument(skip(self, project), fields(id = %project.id))]
    async fn create_project(&self, project: &Project) -> Result<Project> {
        self.fetch(self.request(Method::POST, "/projects").json(project)).await
    }

    #[instrument(skip(self, patch))]
    async fn update_project(&self, id: Uuid, patch: &ProjectPatch) -> Result<Project> {
        match self.put(&format!("/projects/{id}"), patch).await? {
            Some(project) => Ok(project),
            None => self.get_project(id).await,
        }
    }

    #[instrument(skip(self))]
    async fn delete_project(&self, id: Uuid) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/projects/{id}"))).await?;
        Ok(())
    }

    #[instrument(skip(self, entry), fields(id = %entry.id))]
    async fn create_entry(&self, entry: &TimeEntry) -> Result<TimeEntry> {
        self.fetch(self.request(Method::POST, "/entries").json(entry)).await
    }

    #[instrument(skip(self, patch))]
    async fn update_entry(&self, id: Uuid, patch: &TimeEntryPatch) -> Result<TimeEntry> {
        match self.put(&format!("/entries/{id}"), patch).await? {
            Some(entry) => Ok(entry),
            None => self.get_entry(id).await,
        }
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, id: Uuid) -> Result<()> {
        self.send(self.request(Method::DELETE, &format!("/entries/{id}"))).await?;
        Ok(())
    }
}
