//! Storage quota reported by the remote store.

use serde::{Deserialize, Serialize};

/// Total/used/free byte counts.
///
/// `used + free == total` is expected but not enforced; the server is trusted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StorageQuota {
    #[serde(rename = "total")]
    pub total_bytes: u64,

    #[serde(rename = "used")]
    pub used_bytes: u64,

    #[serde(rename = "free")]
    pub free_bytes: u64,
}
