//! In-memory `RemoteStore` used by the unit tests.

use crate::{
    errors::{ClientError, ClientResult},
    models::{FileRecord, LocalFile, StorageQuota},
    services::remote_store::{ProgressFn, RemoteStore, UploadAck},
};
use async_trait::async_trait;
use chrono::{TimeZone, Utc};
use std::{
    collections::HashSet,
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

pub const CAPACITY: u64 = 1_000;

#[derive(Default)]
struct Inner {
    files: Vec<FileRecord>,
    fail_uploads: HashSet<String>,
    reject_uploads: HashSet<String>,
    fail_list: bool,
    fail_quota: bool,
    next_id: u64,
}

#[derive(Default)]
pub struct FakeStore {
    inner: Mutex<Inner>,
    pub list_calls: AtomicUsize,
    pub quota_calls: AtomicUsize,
    pub upload_calls: AtomicUsize,
    pub remove_calls: AtomicUsize,
    in_flight: AtomicUsize,
    /// Highest number of uploads observed running at the same time.
    pub peak_in_flight: AtomicUsize,
    /// Artificial latency per upload, scaled by name length so siblings interleave.
    pub upload_delay: Option<Duration>,
}

pub fn record(name: &str, mime_type: &str, size_bytes: u64) -> FileRecord {
    FileRecord {
        id: format!("id-{}", name),
        name: name.into(),
        mime_type: mime_type.into(),
        size_bytes,
        modified_at: Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap(),
    }
}

pub fn local(name: &str, mime_type: &str, size_bytes: u64) -> LocalFile {
    LocalFile {
        path: format!("/tmp/{}", name).into(),
        name: name.into(),
        mime_type: mime_type.into(),
        size_bytes,
    }
}

impl FakeStore {
    pub fn with_files(files: Vec<FileRecord>) -> Self {
        let store = Self::default();
        store.inner.lock().unwrap().files = files;
        store
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.upload_delay = Some(delay);
        self
    }

    pub fn fail_upload(&self, name: &str) {
        self.inner.lock().unwrap().fail_uploads.insert(name.into());
    }

    pub fn reject_upload(&self, name: &str) {
        self.inner.lock().unwrap().reject_uploads.insert(name.into());
    }

    pub fn set_fail_list(&self, fail: bool) {
        self.inner.lock().unwrap().fail_list = fail;
    }

    pub fn set_fail_quota(&self, fail: bool) {
        self.inner.lock().unwrap().fail_quota = fail;
    }

    pub fn names(&self) -> Vec<String> {
        let inner = self.inner.lock().unwrap();
        inner.files.iter().map(|f| f.name.clone()).collect()
    }

    fn used(inner: &Inner) -> u64 {
        inner.files.iter().map(|f| f.size_bytes).sum()
    }
}

#[async_trait]
impl RemoteStore for FakeStore {
    async fn list(&self) -> ClientResult<Vec<FileRecord>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let inner = self.inner.lock().unwrap();
        if inner.fail_list {
            return Err(ClientError::Transport("list unavailable".into()));
        }
        Ok(inner.files.clone())
    }

    async fn quota(&self) -> ClientResult<StorageQuota> {
        self.quota_calls.fetch_add(1, Ordering::SeqCst);
        tokio::task::yield_now().await;
        let inner = self.inner.lock().unwrap();
        if inner.fail_quota {
            return Err(ClientError::Transport("storage unavailable".into()));
        }
        let used = Self::used(&inner);
        Ok(StorageQuota {
            total_bytes: CAPACITY,
            used_bytes: used,
            free_bytes: CAPACITY.saturating_sub(used),
        })
    }

    async fn upload(
        &self,
        file: &LocalFile,
        on_progress: ProgressFn<'_>,
    ) -> ClientResult<UploadAck> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);

        on_progress(10);
        if let Some(delay) = self.upload_delay {
            tokio::time::sleep(delay * file.name.len() as u32).await;
        } else {
            tokio::task::yield_now().await;
        }
        on_progress(50);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().unwrap();
        if inner.fail_uploads.contains(&file.name) {
            return Err(ClientError::Transport("connection reset".into()));
        }
        if inner.reject_uploads.contains(&file.name)
            || Self::used(&inner) + file.size_bytes > CAPACITY
        {
            return Err(ClientError::Rejected("quota exceeded".into()));
        }

        inner.next_id += 1;
        let mut rec = record(&file.name, &file.mime_type, file.size_bytes);
        rec.id = format!("srv-{}", inner.next_id);
        inner.files.retain(|f| f.name != file.name);
        inner.files.push(rec.clone());
        drop(inner);

        on_progress(100);
        Ok(UploadAck {
            success: Some(true),
            file: Some(rec),
            error: None,
            message: None,
        })
    }

    async fn remove(&self, name: &str) -> ClientResult<()> {
        self.remove_calls.fetch_add(1, Ordering::SeqCst);
        let mut inner = self.inner.lock().unwrap();
        let before = inner.files.len();
        inner.files.retain(|f| f.name != name);
        if inner.files.len() == before {
            return Err(ClientError::NotFound(name.into()));
        }
        Ok(())
    }

    fn download_url(&self, name: &str) -> String {
        format!("fake://download/{}", name)
    }

    fn preview_url(&self, name: &str) -> String {
        format!("fake://preview/{}?thumbnail=true", name)
    }
}
