//! src/services/remote_store.rs
//!
//! Remote store client — thin wrapper over the store's HTTP surface:
//!
//! - `GET    /files`                          list file metadata
//! - `GET    /storage`                        quota
//! - `POST   /upload`                         multipart upload, single field `file`
//! - `GET    /download/{name}`                binary content
//! - `GET    /preview/{name}?thumbnail=true`  inline content
//! - `DELETE /delete/{name}`                  remove
//!
//! Every call is independently fallible and never retried here.

use crate::{
    errors::{ClientError, ClientResult},
    models::{FileRecord, LocalFile, StorageQuota},
};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{
    Body, Client, Response,
    multipart::{Form, Part},
};
use serde::Deserialize;
use std::time::Duration;
use tokio::{fs::File, sync::watch};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Progress callback. Receives whole percentages, never decreasing.
pub type ProgressFn<'a> = &'a (dyn Fn(u8) + Send + Sync);

/// What the store hands back after accepting an upload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UploadAck {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub file: Option<FileRecord>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn list(&self) -> ClientResult<Vec<FileRecord>>;

    async fn quota(&self) -> ClientResult<StorageQuota>;

    /// Upload one file. An `Ok` means the record now exists server-side.
    async fn upload(&self, file: &LocalFile, on_progress: ProgressFn<'_>)
    -> ClientResult<UploadAck>;

    async fn remove(&self, name: &str) -> ClientResult<()>;

    fn download_url(&self, name: &str) -> String;

    fn preview_url(&self, name: &str) -> String;
}

/// `GET /files` may answer with a bare array or wrap it in `{ "files": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListBody {
    Bare(Vec<FileRecord>),
    Wrapped { files: Vec<FileRecord> },
}

#[derive(Clone, Debug)]
pub struct HttpRemoteStore {
    client: Client,
    base_url: String,
    /// Applied to the short metadata calls; uploads are bounded only by the
    /// connect timeout so large files are not cut off.
    request_timeout: Duration,
}

impl HttpRemoteStore {
    pub fn new(base_url: impl Into<String>, request_timeout: Duration) -> ClientResult<Self> {
        let client = Client::builder()
            .connect_timeout(request_timeout)
            .build()
            .map_err(|err| ClientError::Transport(format!("building HTTP client: {}", err)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            request_timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn named_url(&self, route: &str, name: &str) -> String {
        format!("{}/{}/{}", self.base_url, route, urlencoding::encode(name))
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn list(&self) -> ClientResult<Vec<FileRecord>> {
        let resp = self
            .client
            .get(self.url("/files"))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let body: ListBody = ensure_success(resp, "files").await?.json().await?;
        let files = match body {
            ListBody::Bare(files) | ListBody::Wrapped { files } => files,
        };
        debug!("listed {} files", files.len());
        Ok(files)
    }

    async fn quota(&self) -> ClientResult<StorageQuota> {
        let resp = self
            .client
            .get(self.url("/storage"))
            .timeout(self.request_timeout)
            .send()
            .await?;
        let quota = ensure_success(resp, "storage").await?.json().await?;
        Ok(quota)
    }

    async fn upload(
        &self,
        file: &LocalFile,
        on_progress: ProgressFn<'_>,
    ) -> ClientResult<UploadAck> {
        let handle = File::open(&file.path).await?;
        let body_len = handle.metadata().await.ok().map(|m| m.len());
        let part_len = body_len.unwrap_or(file.size_bytes);

        // The body is pulled by the transport on its own schedule; byte counts
        // travel back over a watch channel so the borrowed callback stays here.
        let (sent_tx, mut sent_rx) = watch::channel(0u64);
        let mut sent = 0u64;
        let stream = ReaderStream::new(handle).map(move |chunk| {
            if let Ok(bytes) = &chunk {
                sent += bytes.len() as u64;
                let _ = sent_tx.send(sent);
            }
            chunk
        });

        let part = Part::stream_with_length(Body::wrap_stream(stream), part_len)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|err| ClientError::Rejected(format!("invalid MIME type: {}", err)))?;
        let form = Form::new().part("file", part);

        let request = self.client.post(self.url("/upload")).multipart(form).send();
        tokio::pin!(request);

        let mut reported = 0u8;
        let resp = loop {
            tokio::select! {
                res = &mut request => break res?,
                changed = sent_rx.changed() => {
                    if changed.is_err() {
                        // Body fully consumed; only the acknowledgement is left.
                        break (&mut request).await?;
                    }
                    let bytes = *sent_rx.borrow_and_update();
                    let pct = transfer_percent(bytes, body_len, file.size_bytes);
                    if pct > reported {
                        reported = pct;
                        on_progress(pct);
                    }
                }
            }
        };

        let resp = ensure_success(resp, &file.name).await?;
        let text = resp.text().await?;
        let ack = parse_ack(&text)?;

        on_progress(100);
        Ok(ack)
    }

    async fn remove(&self, name: &str) -> ClientResult<()> {
        let resp = self
            .client
            .delete(self.named_url("delete", name))
            .timeout(self.request_timeout)
            .send()
            .await?;
        ensure_success(resp, name).await?;
        Ok(())
    }

    fn download_url(&self, name: &str) -> String {
        self.named_url("download", name)
    }

    fn preview_url(&self, name: &str) -> String {
        format!("{}?thumbnail=true", self.named_url("preview", name))
    }
}

/// Percentage of a transfer, held below 100 until the store acknowledges.
///
/// `total` is what the transport knows about the body length; when unknown the
/// local file size is used instead.
pub fn transfer_percent(sent: u64, total: Option<u64>, local_size: u64) -> u8 {
    let total = total.filter(|t| *t > 0).unwrap_or(local_size);
    if total == 0 {
        return 99;
    }
    let pct = sent.saturating_mul(100) / total;
    pct.min(99) as u8
}

/// Interpret the body of a 2xx upload response.
///
/// An empty body is a plain acknowledgement. `success: false`, or an `error`
/// without `success: true`, is a rejection. A body that is not an
/// acknowledgement at all (e.g. a proxy page) is a transport failure.
fn parse_ack(body: &str) -> ClientResult<UploadAck> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(UploadAck::default());
    }

    let ack: UploadAck = serde_json::from_str(trimmed).map_err(|err| {
        ClientError::Transport(format!("unreadable upload acknowledgement: {}", err))
    })?;

    match (ack.success, ack.error.is_some()) {
        (Some(false), _) | (None, true) => Err(ClientError::Rejected(
            ack.error
                .or(ack.message)
                .unwrap_or_else(|| "upload declined".into()),
        )),
        _ => Ok(ack),
    }
}

/// Turn a non-2xx response into the matching `ClientError`.
async fn ensure_success(resp: Response, subject: &str) -> ClientResult<Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    let message = error_message(&body)
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("request failed").into());
    Err(ClientError::from_status(status, subject, message))
}

/// Pull `error`/`message` out of a JSON error body, else use the raw text.
fn error_message(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<serde_json::Value>(trimmed) {
        Ok(value) => value
            .get("error")
            .or_else(|| value.get("message"))
            .and_then(|v| v.as_str())
            .map(str::to_string),
        Err(_) => Some(trimmed.to_string()),
    }
}
