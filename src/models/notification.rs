//! User-visible, non-fatal notifications scoped to a file or operation.

use serde::Serialize;

#[derive(Serialize, Clone, Copy, Debug, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Success,
    Failure,
}

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct Notification {
    /// File name (or operation) the message is about.
    pub scope: String,
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    pub fn success(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind: NotificationKind::Success,
            message: message.into(),
        }
    }

    pub fn failure(scope: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            scope: scope.into(),
            kind: NotificationKind::Failure,
            message: message.into(),
        }
    }
}
