//! Application state handed to the presentation layer.
//!
//! Holds the registry, the upload orchestrator, the delete/download actions and
//! the current view selection. One instance per session, passed by reference.

use crate::{
    config::ClientConfig,
    errors::ClientResult,
    models::{BatchReport, Category, FileRecord, LocalFile, Notification, UploadTask},
    services::{
        Confirm, DeleteOutcome, FileActions, FileRegistry, HttpRemoteStore, Notifier,
        RemoteStore, Snapshot, UploadOrchestrator,
    },
};
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc::UnboundedReceiver;

/// What the user is currently looking at.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewSelection {
    pub category: Category,
    pub search: String,
}

pub struct AppState {
    registry: Arc<FileRegistry>,
    uploads: UploadOrchestrator,
    actions: FileActions,
    view: Mutex<ViewSelection>,
}

impl AppState {
    /// Wire everything over an arbitrary store. Returns the receiving end of
    /// the notification channel for the renderer to drain.
    pub fn new(
        store: Arc<dyn RemoteStore>,
        max_concurrent_uploads: Option<usize>,
    ) -> (Self, UnboundedReceiver<Notification>) {
        let (notifier, rx) = Notifier::channel();
        let registry = Arc::new(FileRegistry::new(store));
        let uploads =
            UploadOrchestrator::new(registry.clone(), notifier.clone(), max_concurrent_uploads);
        let actions = FileActions::new(registry.clone(), notifier);

        let state = Self {
            registry,
            uploads,
            actions,
            view: Mutex::new(ViewSelection::default()),
        };
        (state, rx)
    }

    /// Build state backed by the HTTP store described in `config`.
    pub fn from_config(
        config: &ClientConfig,
    ) -> ClientResult<(Self, UnboundedReceiver<Notification>)> {
        let store = HttpRemoteStore::new(config.base_url.clone(), config.request_timeout())?;
        Ok(Self::new(Arc::new(store), config.max_concurrent_uploads))
    }

    pub fn registry(&self) -> &FileRegistry {
        &self.registry
    }

    pub fn uploads(&self) -> &UploadOrchestrator {
        &self.uploads
    }

    pub async fn refresh(&self) -> ClientResult<Arc<Snapshot>> {
        self.registry.refresh().await
    }

    pub fn select_category(&self, category: Category) {
        self.lock_view().category = category;
    }

    pub fn set_search(&self, search: impl Into<String>) {
        self.lock_view().search = search.into();
    }

    pub fn selection(&self) -> ViewSelection {
        self.lock_view().clone()
    }

    /// Registry contents filtered by the current selection.
    pub fn visible_files(&self) -> Vec<FileRecord> {
        let view = self.selection();
        self.registry.query(view.category, &view.search)
    }

    pub async fn upload(&self, files: Vec<LocalFile>) -> BatchReport {
        self.uploads.submit(files).await
    }

    pub fn upload_progress(&self) -> Vec<UploadTask> {
        self.uploads.progress()
    }

    pub async fn delete(&self, name: &str, confirm: impl Confirm) -> ClientResult<DeleteOutcome> {
        self.actions.delete(name, confirm).await
    }

    pub fn download_url(&self, name: &str) -> String {
        self.actions.download_url(name)
    }

    pub fn preview_url(&self, name: &str) -> String {
        self.actions.preview_url(name)
    }

    fn lock_view(&self) -> std::sync::MutexGuard<'_, ViewSelection> {
        self.view
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
