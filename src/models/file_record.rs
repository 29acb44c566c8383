//! Represents a file stored on the remote store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Server-authoritative metadata for one stored object.
///
/// Records are never patched locally: the registry replaces the whole set on
/// every refresh.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    /// Opaque identifier, stable across refreshes.
    pub id: String,

    /// Display label and server-side addressing key. Unique within the store.
    pub name: String,

    /// MIME type as reported by the store.
    #[serde(alias = "type", default = "default_mime_type")]
    pub mime_type: String,

    #[serde(rename = "size")]
    pub size_bytes: u64,

    #[serde(alias = "modified")]
    pub modified_at: DateTime<Utc>,
}

fn default_mime_type() -> String {
    "application/octet-stream".into()
}
