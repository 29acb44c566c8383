//! Delete and download flows. Neither is orchestrated: delete is a single
//! confirmed request followed by one refresh, download is address resolution.

use crate::{
    errors::ClientResult,
    models::Notification,
    services::{notifier::Notifier, registry::FileRegistry},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Confirmation gate in front of destructive actions.
pub trait Confirm {
    fn confirm(&mut self, name: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, name: &str) -> bool {
        self(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    /// The user declined; nothing was sent.
    Declined,
}

pub struct FileActions {
    registry: Arc<FileRegistry>,
    notifier: Notifier,
}

impl FileActions {
    pub fn new(registry: Arc<FileRegistry>, notifier: Notifier) -> Self {
        Self { registry, notifier }
    }

    /// Remove `name` from the store after the user confirms.
    ///
    /// On success the registry is refreshed once. On failure the registry is
    /// left alone and the error is both notified and returned.
    pub async fn delete(
        &self,
        name: &str,
        mut confirm: impl Confirm,
    ) -> ClientResult<DeleteOutcome> {
        if !confirm.confirm(name) {
            info!(name, "delete declined");
            return Ok(DeleteOutcome::Declined);
        }

        if let Err(err) = self.registry.store().remove(name).await {
            warn!(name, "delete failed: {}", err);
            self.notifier.notify(Notification::failure(
                name,
                format!("could not delete {}: {}", name, err),
            ));
            return Err(err);
        }

        info!(name, "deleted");
        self.notifier
            .notify(Notification::success(name, format!("{} deleted", name)));

        if let Err(err) = self.registry.refresh().await {
            self.notifier
                .notify(Notification::failure("refresh", err.to_string()));
        }
        Ok(DeleteOutcome::Deleted)
    }

    pub fn download_url(&self, name: &str) -> String {
        self.registry.store().download_url(name)
    }

    pub fn preview_url(&self, name: &str) -> String {
        self.registry.store().preview_url(name)
    }
}
