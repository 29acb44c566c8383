//! src/services/orchestrator.rs
//!
//! UploadOrchestrator — drives a batch of local files to the remote store with
//! independent progress and independent failure per file, then reconciles the
//! registry exactly once for the whole batch.

use crate::{
    errors::{ClientError, ClientResult},
    models::{
        BatchReport, LocalFile, Notification, TaskId, TaskOutcome, UploadStatus, UploadTask,
    },
    services::{notifier::Notifier, registry::FileRegistry, remote_store::UploadAck},
};
use futures::{StreamExt, stream};
use std::{
    collections::BTreeMap,
    sync::{
        Arc, Mutex, MutexGuard,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, debug, info, info_span, warn};
use uuid::Uuid;

pub struct UploadOrchestrator {
    registry: Arc<FileRegistry>,
    notifier: Notifier,
    /// `None` launches every file of a batch at once.
    max_concurrent: Option<usize>,
    /// Live progress set, ordered by submission.
    tasks: Mutex<BTreeMap<TaskId, UploadTask>>,
    next_index: AtomicUsize,
    cancel: Mutex<CancellationToken>,
}

impl UploadOrchestrator {
    pub fn new(
        registry: Arc<FileRegistry>,
        notifier: Notifier,
        max_concurrent: Option<usize>,
    ) -> Self {
        Self {
            registry,
            notifier,
            max_concurrent: max_concurrent.filter(|n| *n > 0),
            tasks: Mutex::new(BTreeMap::new()),
            next_index: AtomicUsize::new(0),
            cancel: Mutex::new(CancellationToken::new()),
        }
    }

    /// Upload every file, wait for all of them to settle, refresh once.
    ///
    /// Never fails as a whole: per-file failures are reported through the
    /// returned `BatchReport` and scoped notifications.
    pub async fn submit(&self, files: Vec<LocalFile>) -> BatchReport {
        let batch_id = Uuid::new_v4();
        if files.is_empty() {
            return BatchReport {
                batch_id,
                outcomes: Vec::new(),
                refreshed: false,
            };
        }

        let span = info_span!("upload_batch", %batch_id, files = files.len());
        self.run_batch(batch_id, files).instrument(span).await
    }

    async fn run_batch(&self, batch_id: Uuid, files: Vec<LocalFile>) -> BatchReport {
        let token = self.lock_cancel().clone();
        let ids: Vec<TaskId> = files
            .iter()
            .map(|file| TaskId {
                index: self.next_index.fetch_add(1, Ordering::SeqCst),
                name: file.name.clone(),
            })
            .collect();

        {
            let mut tasks = self.lock_tasks();
            for id in &ids {
                tasks.insert(id.clone(), UploadTask::new(id.clone()));
            }
        }
        info!("batch submitted");

        let limit = self.max_concurrent.unwrap_or(files.len()).max(1);
        let mut outcomes: Vec<TaskOutcome> = stream::iter(ids.iter().cloned().zip(files))
            .map(|(id, file)| self.run_task(id, file, &token))
            .buffer_unordered(limit)
            .collect()
            .await;
        outcomes.sort_by(|a, b| a.id.cmp(&b.id));

        let refreshed = match self.registry.refresh().await {
            Ok(_) => true,
            Err(err) => {
                self.notifier
                    .notify(Notification::failure("refresh", err.to_string()));
                false
            }
        };

        {
            let mut tasks = self.lock_tasks();
            for id in &ids {
                tasks.remove(id);
            }
        }

        let failed = outcomes
            .iter()
            .filter(|o| o.status == UploadStatus::Failed)
            .count();
        info!(
            succeeded = outcomes.len() - failed,
            failed, refreshed, "batch settled"
        );

        BatchReport {
            batch_id,
            outcomes,
            refreshed,
        }
    }

    async fn run_task(&self, id: TaskId, file: LocalFile, token: &CancellationToken) -> TaskOutcome {
        if token.is_cancelled() {
            return self.settle(id, Err(ClientError::Cancelled));
        }
        self.update(&id, |task| {
            task.transition(UploadStatus::InProgress);
        });
        debug!(task = %id, size = file.size_bytes, "upload started");

        let on_progress = |percent: u8| {
            self.update(&id, |task| task.advance(percent));
        };
        let store = self.registry.store();
        let result = tokio::select! {
            res = store.upload(&file, &on_progress) => res,
            _ = token.cancelled() => Err(ClientError::Cancelled),
        };

        self.settle(id, result)
    }

    fn settle(&self, id: TaskId, result: ClientResult<UploadAck>) -> TaskOutcome {
        match result {
            Ok(_) => {
                self.update(&id, |task| {
                    task.transition(UploadStatus::Succeeded);
                });
                info!(task = %id, "upload succeeded");
                self.notifier.notify(Notification::success(
                    id.name.clone(),
                    format!("{} uploaded", id.name),
                ));
                TaskOutcome {
                    id,
                    status: UploadStatus::Succeeded,
                    error: None,
                }
            }
            Err(err) => {
                // Failed entries leave the live set right away; the report
                // and the notification still carry the failure.
                self.lock_tasks().remove(&id);
                warn!(task = %id, "upload failed: {}", err);
                self.notifier.notify(Notification::failure(
                    id.name.clone(),
                    format!("{} failed: {}", id.name, err),
                ));
                TaskOutcome {
                    id,
                    status: UploadStatus::Failed,
                    error: Some(err.to_string()),
                }
            }
        }
    }

    /// Cancel every batch currently running. Later batches are unaffected.
    pub fn cancel(&self) {
        let mut current = self.lock_cancel();
        current.cancel();
        *current = CancellationToken::new();
        info!("uploads cancelled");
    }

    /// Live progress view, in submission order.
    pub fn progress(&self) -> Vec<UploadTask> {
        self.lock_tasks().values().cloned().collect()
    }

    pub fn is_idle(&self) -> bool {
        self.lock_tasks().is_empty()
    }

    fn update(&self, id: &TaskId, apply: impl FnOnce(&mut UploadTask)) {
        if let Some(task) = self.lock_tasks().get_mut(id) {
            apply(task);
        }
    }

    fn lock_tasks(&self) -> MutexGuard<'_, BTreeMap<TaskId, UploadTask>> {
        self.tasks
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn lock_cancel(&self) -> MutexGuard<'_, CancellationToken> {
        self.cancel
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}
