//! In-process mock of the remote store's HTTP surface.
//!
//! - `GET    /files`
//! - `GET    /storage`
//! - `POST   /upload`          (multipart, field `file`)
//! - `GET    /download/{name}`
//! - `GET    /preview/{name}`
//! - `DELETE /delete/{name}`

#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use chrono::Utc;
use drive_client::models::{FileRecord, StorageQuota};
use serde::Deserialize;
use serde_json::json;
use std::{
    collections::HashSet,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tokio::net::TcpListener;

pub const CAPACITY: u64 = 1_000_000;

struct Stored {
    record: FileRecord,
    content: Vec<u8>,
}

#[derive(Default)]
struct Inner {
    files: Vec<Stored>,
    /// Uploads of these names get a 503.
    broken: HashSet<String>,
    /// Uploads of these names get a 200 carrying `{ "error": ... }`.
    declined_in_body: HashSet<String>,
    /// Uploads of these names get a 200 HTML page, like a misbehaving proxy.
    proxied: HashSet<String>,
    fail_list: bool,
    next_id: u64,
}

#[derive(Clone, Default)]
pub struct MockStore {
    inner: Arc<Mutex<Inner>>,
    pub list_hits: Arc<AtomicUsize>,
    pub storage_hits: Arc<AtomicUsize>,
    pub last_preview_thumbnail: Arc<Mutex<Option<bool>>>,
}

impl MockStore {
    pub fn break_uploads_of(&self, name: &str) {
        self.inner.lock().unwrap().broken.insert(name.into());
    }

    pub fn decline_in_body(&self, name: &str) {
        self.inner.lock().unwrap().declined_in_body.insert(name.into());
    }

    pub fn answer_with_proxy_page(&self, name: &str) {
        self.inner.lock().unwrap().proxied.insert(name.into());
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.inner.lock().unwrap().fail_list = fail;
    }

    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.files.iter().map(|f| f.record.name.clone()).collect()
    }

    pub fn list_hits(&self) -> usize {
        self.list_hits.load(Ordering::SeqCst)
    }

    fn used(inner: &Inner) -> u64 {
        inner.files.iter().map(|f| f.record.size_bytes).sum()
    }
}

/// Error body shaped like the store's: `{ "error": "..." }`.
struct MockError {
    status: StatusCode,
    message: String,
}

impl MockError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }
}

impl IntoResponse for MockError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

async fn list_files(State(store): State<MockStore>) -> Result<impl IntoResponse, MockError> {
    store.list_hits.fetch_add(1, Ordering::SeqCst);
    let inner = store.inner.lock().unwrap();
    if inner.fail_list {
        return Err(MockError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "listing unavailable",
        ));
    }
    let records: Vec<FileRecord> = inner.files.iter().map(|f| f.record.clone()).collect();
    Ok(Json(records))
}

async fn storage(State(store): State<MockStore>) -> impl IntoResponse {
    store.storage_hits.fetch_add(1, Ordering::SeqCst);
    let inner = store.inner.lock().unwrap();
    let used = MockStore::used(&inner);
    Json(StorageQuota {
        total_bytes: CAPACITY,
        used_bytes: used,
        free_bytes: CAPACITY - used,
    })
}

async fn upload(
    State(store): State<MockStore>,
    mut multipart: Multipart,
) -> Result<Response, MockError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| MockError::new(StatusCode::BAD_REQUEST, e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| MockError::new(StatusCode::BAD_REQUEST, "missing file name"))?;
        let mime_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| MockError::new(StatusCode::BAD_REQUEST, e.to_string()))?
            .to_vec();

        let mut inner = store.inner.lock().unwrap();
        if inner.broken.contains(&name) {
            return Err(MockError::new(
                StatusCode::SERVICE_UNAVAILABLE,
                "storage node offline",
            ));
        }
        if inner.declined_in_body.contains(&name) {
            return Ok(Json(json!({ "error": "quota exceeded" })).into_response());
        }
        if inner.proxied.contains(&name) {
            return Ok(binary(
                "text/html".into(),
                b"<html>proxy error</html>".to_vec(),
            ));
        }
        if MockStore::used(&inner) + content.len() as u64 > CAPACITY {
            return Err(MockError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                "quota exceeded",
            ));
        }

        inner.next_id += 1;
        let record = FileRecord {
            id: format!("obj-{}", inner.next_id),
            name: name.clone(),
            mime_type,
            size_bytes: content.len() as u64,
            modified_at: Utc::now(),
        };
        inner.files.retain(|f| f.record.name != name);
        inner.files.push(Stored {
            record: record.clone(),
            content,
        });
        return Ok(Json(json!({ "success": true, "file": record })).into_response());
    }
    Err(MockError::new(StatusCode::BAD_REQUEST, "no file field"))
}

fn content_of(store: &MockStore, name: &str) -> Result<(String, Vec<u8>), MockError> {
    let inner = store.inner.lock().unwrap();
    inner
        .files
        .iter()
        .find(|f| f.record.name == name)
        .map(|f| (f.record.mime_type.clone(), f.content.clone()))
        .ok_or_else(|| MockError::new(StatusCode::NOT_FOUND, "file not found"))
}

fn binary(mime_type: String, content: Vec<u8>) -> Response {
    let mut response = Response::new(Body::from(content));
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_str(&mime_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream")),
    );
    response
}

async fn download(
    State(store): State<MockStore>,
    Path(name): Path<String>,
) -> Result<Response, MockError> {
    let (mime_type, content) = content_of(&store, &name)?;
    Ok(binary(mime_type, content))
}

#[derive(Deserialize)]
struct PreviewQuery {
    thumbnail: Option<bool>,
}

async fn preview(
    State(store): State<MockStore>,
    Path(name): Path<String>,
    Query(q): Query<PreviewQuery>,
) -> Result<Response, MockError> {
    *store.last_preview_thumbnail.lock().unwrap() = q.thumbnail;
    let (mime_type, content) = content_of(&store, &name)?;
    Ok(binary(mime_type, content))
}

async fn remove(
    State(store): State<MockStore>,
    Path(name): Path<String>,
) -> Result<impl IntoResponse, MockError> {
    let mut inner = store.inner.lock().unwrap();
    let before = inner.files.len();
    inner.files.retain(|f| f.record.name != name);
    if inner.files.len() == before {
        return Err(MockError::new(StatusCode::NOT_FOUND, "file not found"));
    }
    Ok(Json(json!({ "success": true })))
}

pub fn routes() -> Router<MockStore> {
    Router::new()
        .route("/files", get(list_files))
        .route("/storage", get(storage))
        .route("/upload", post(upload))
        .route("/download/{name}", get(download))
        .route("/preview/{name}", get(preview))
        .route("/delete/{name}", delete(remove))
}

/// Serve a fresh mock store on an ephemeral port. Returns its base URL.
pub async fn spawn() -> (String, MockStore) {
    let store = MockStore::default();
    let app = routes().with_state(store.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{}", addr), store)
}

pub const TIMEOUT: Duration = Duration::from_secs(10);
