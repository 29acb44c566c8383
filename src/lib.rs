//! Client for a remote file drive.
//!
//! Mirrors the store's file list and quota in a [`services::FileRegistry`],
//! uploads batches of local files through a [`services::UploadOrchestrator`]
//! and reconciles after every mutation by re-fetching rather than patching.

pub mod config;
pub mod errors;
pub mod format;
pub mod models;
pub mod services;
pub mod state;

pub use errors::{ClientError, ClientResult};
pub use state::AppState;
