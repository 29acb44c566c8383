//! Error taxonomy shared by the remote store client, the registry and the
//! upload orchestrator.

use reqwest::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Network failure, connectivity loss or a 5xx from the remote store.
    #[error("transport error: {0}")]
    Transport(String),

    /// The store answered but declined the request (quota exceeded, bad name, ...).
    #[error("rejected by remote store: {0}")]
    Rejected(String),

    #[error("`{0}` not found on remote store")]
    NotFound(String),

    /// A reconciliation pass could not complete; the previous snapshot is kept.
    #[error("refresh failed: {0}")]
    RefreshFailed(Box<ClientError>),

    #[error("upload cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type ClientResult<T> = Result<T, ClientError>;

impl ClientError {
    /// Classify a non-success HTTP status into the taxonomy.
    ///
    /// `subject` names the file involved, `message` is whatever the server
    /// put in its error body.
    pub fn from_status(status: StatusCode, subject: &str, message: impl Into<String>) -> Self {
        let message = message.into();
        if status == StatusCode::NOT_FOUND {
            ClientError::NotFound(subject.to_string())
        } else if status.is_server_error() {
            ClientError::Transport(format!("{} ({})", message, status.as_u16()))
        } else {
            ClientError::Rejected(message)
        }
    }

    /// Wrap an error raised during `list()`/`quota()` as a refresh failure.
    pub fn refresh_failed(err: ClientError) -> Self {
        match err {
            already @ ClientError::RefreshFailed(_) => already,
            other => ClientError::RefreshFailed(Box::new(other)),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(StatusCode::NOT_FOUND) => ClientError::NotFound(
                err.url()
                    .map(|u| u.path().to_string())
                    .unwrap_or_else(|| "resource".into()),
            ),
            Some(status) if status.is_client_error() => ClientError::Rejected(err.to_string()),
            _ => ClientError::Transport(err.to_string()),
        }
    }
}
