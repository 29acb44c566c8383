//! Client-side upload bookkeeping. Owned by the upload orchestrator.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Per-task identifier generated at submission time.
///
/// Combines the position in the batch with the file name so two files with
/// the same name in one batch never share a progress entry.
#[derive(Serialize, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId {
    pub index: usize,
    pub name: String,
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.index, self.name)
    }
}

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UploadStatus {
    Pending,
    InProgress,
    Succeeded,
    Failed,
}

impl UploadStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, UploadStatus::Succeeded | UploadStatus::Failed)
    }
}

/// Live progress entry for one file of a batch.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct UploadTask {
    pub id: TaskId,
    pub percent_complete: u8,
    pub status: UploadStatus,
}

impl UploadTask {
    pub fn new(id: TaskId) -> Self {
        Self {
            id,
            percent_complete: 0,
            status: UploadStatus::Pending,
        }
    }

    /// Apply a progress report. Values never go backwards and are capped at 100.
    /// Reports after a terminal state are ignored.
    pub fn advance(&mut self, percent: u8) {
        if self.status.is_terminal() {
            return;
        }
        self.percent_complete = self.percent_complete.max(percent.min(100));
    }

    /// Move to a new status. Terminal states are final.
    pub fn transition(&mut self, next: UploadStatus) -> bool {
        let allowed = match (self.status, next) {
            (UploadStatus::Pending, UploadStatus::InProgress) => true,
            (UploadStatus::Pending | UploadStatus::InProgress, s) if s.is_terminal() => true,
            _ => false,
        };
        if allowed {
            self.status = next;
            if next == UploadStatus::Succeeded {
                self.percent_complete = 100;
            }
        }
        allowed
    }
}

/// Terminal result of a single task.
#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct TaskOutcome {
    pub id: TaskId,
    pub status: UploadStatus,
    /// Failure message for failed tasks.
    pub error: Option<String>,
}

/// Summary returned once every task of a batch has settled.
#[derive(Serialize, Clone, Debug)]
pub struct BatchReport {
    pub batch_id: Uuid,
    pub outcomes: Vec<TaskOutcome>,
    /// Whether the post-batch reconciliation pass succeeded.
    pub refreshed: bool,
}

impl BatchReport {
    pub fn succeeded(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == UploadStatus::Succeeded)
    }

    pub fn failed(&self) -> impl Iterator<Item = &TaskOutcome> {
        self.outcomes
            .iter()
            .filter(|o| o.status == UploadStatus::Failed)
    }
}
