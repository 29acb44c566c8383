//! Core services: remote store access, the file registry, upload
//! orchestration and the delete/download flows.

pub mod file_actions;
pub mod notifier;
pub mod orchestrator;
pub mod registry;
pub mod remote_store;

#[cfg(test)]
pub(crate) mod test_support;

pub use file_actions::{Confirm, DeleteOutcome, FileActions};
pub use notifier::Notifier;
pub use orchestrator::UploadOrchestrator;
pub use registry::{FileRegistry, Snapshot};
pub use remote_store::{HttpRemoteStore, ProgressFn, RemoteStore, UploadAck};
