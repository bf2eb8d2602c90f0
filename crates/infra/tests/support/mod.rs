//! Shared helpers for infra integration tests

#![allow(dead_code)]

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use parking_lot::Mutex;
use serde_json::{json, Value};
use timesheet_common::testing::TempDir;
use timesheet_domain::Snapshot;
use timesheet_infra::SqliteLocalStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const OWNER: &str = "acme";
pub const REPO: &str = "hours";
pub const CONTENTS_PATH: &str = "/repos/acme/hours/contents/data/timesheet.json";

/// SQLite store in a directory removed on drop
pub struct TestStore {
    pub dir: TempDir,
    pub store: Arc<SqliteLocalStore>,
}

impl TestStore {
    pub fn new() -> Self {
        let dir = TempDir::new("timesheet-infra").expect("temp dir should be created");
        let store = Arc::new(Self::open_in(&dir));
        Self { dir, store }
    }

    /// A second handle on the same database file, as after a restart.
    pub fn reopen(&self) -> Arc<SqliteLocalStore> {
        Arc::new(Self::open_in(&self.dir))
    }

    fn open_in(dir: &TempDir) -> SqliteLocalStore {
        SqliteLocalStore::open(dir.path().join("timesheet.db"), 2).expect("store should open")
    }
}

#[derive(Default)]
struct FileState {
    content: Option<Snapshot>,
    revision: u64,
    puts: usize,
}

/// Stateful stand-in for one file behind the GitHub contents API.
///
/// Enforces the blob-sha precondition the real API applies to `PUT`.
#[derive(Clone, Default)]
pub struct FakeContentsApi {
    state: Arc<Mutex<FileState>>,
}

impl FakeContentsApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_file(snapshot: Snapshot) -> Self {
        let api = Self::new();
        api.replace(snapshot);
        api
    }

    /// Change the file as another client would.
    pub fn replace(&self, snapshot: Snapshot) {
        let mut state = self.state.lock();
        state.content = Some(snapshot);
        state.revision += 1;
    }

    pub fn file(&self) -> Option<Snapshot> {
        self.state.lock().content.clone()
    }

    pub fn sha(&self) -> Option<String> {
        let state = self.state.lock();
        state.content.as_ref().map(|_| format!("sha{}", state.revision))
    }

    pub fn put_count(&self) -> usize {
        self.state.lock().puts
    }

    pub async fn mount(&self, server: &MockServer) {
        Mock::given(method("GET"))
            .and(path(format!("/repos/{OWNER}/{REPO}")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"full_name": "acme/hours"})),
            )
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(CONTENTS_PATH))
            .respond_with(self.clone())
            .mount(server)
            .await;
        Mock::given(method("PUT"))
            .and(path(CONTENTS_PATH))
            .respond_with(self.clone())
            .mount(server)
            .await;
    }

    fn get(&self) -> ResponseTemplate {
        let state = self.state.lock();
        match &state.content {
            None => ResponseTemplate::new(404).set_body_json(json!({"message": "Not Found"})),
            Some(snapshot) => {
                let encoded = STANDARD.encode(serde_json::to_vec_pretty(snapshot).unwrap());
                // the contents API wraps base64 at 60 columns
                let wrapped: Vec<&str> = encoded
                    .as_bytes()
                    .chunks(60)
                    .map(|c| std::str::from_utf8(c).unwrap())
                    .collect();
                ResponseTemplate::new(200).set_body_json(json!({
                    "content": wrapped.join("\n"),
                    "sha": format!("sha{}", state.revision),
                }))
            }
        }
    }

    fn put(&self, body: &Value) -> ResponseTemplate {
        let mut state = self.state.lock();
        let current = state.content.as_ref().map(|_| format!("sha{}", state.revision));
        let supplied = body.get("sha").and_then(Value::as_str).map(str::to_string);

        match (&current, &supplied) {
            (Some(_), None) => {
                return ResponseTemplate::new(422)
                    .set_body_json(json!({"message": "\"sha\" wasn't supplied."}));
            }
            (current, Some(sha)) if current.as_deref() != Some(sha.as_str()) => {
                return ResponseTemplate::new(409)
                    .set_body_json(json!({"message": "data/timesheet.json does not match"}));
            }
            _ => {}
        }

        let raw = STANDARD.decode(body["content"].as_str().unwrap()).unwrap();
        state.content = Some(serde_json::from_slice(&raw).unwrap());
        state.revision += 1;
        state.puts += 1;
        let status = if current.is_some() { 200 } else { 201 };
        ResponseTemplate::new(status)
            .set_body_json(json!({"content": {"sha": format!("sha{}", state.revision)}}))
    }
}

impl Respond for FakeContentsApi {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        if request.method.as_str() == "PUT" {
            let body: Value = request.body_json().unwrap();
            self.put(&body)
        } else {
            self.get()
        }
    }
}
