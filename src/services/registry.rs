//! src/services/registry.rs
//!
//! FileRegistry — the client's single mirror of server-side file metadata and
//! quota. The mirror is only ever replaced wholesale by `refresh()`; uploads and
//! deletes never patch it locally.

use crate::{
    errors::{ClientError, ClientResult},
    models::{Category, FileRecord, StorageQuota},
    services::remote_store::RemoteStore,
};
use std::sync::{
    Arc, RwLock,
    atomic::{AtomicU64, Ordering},
};
use tracing::{debug, info, warn};

/// Files and quota fetched together. Never mutated after construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub files: Vec<FileRecord>,
    pub quota: StorageQuota,
    /// Which refresh produced this snapshot; 0 for the initial empty one.
    pub generation: u64,
}

impl Snapshot {
    /// Filter by category and case-insensitive name substring, keeping
    /// server order.
    pub fn query(&self, category: Category, search: &str) -> Vec<FileRecord> {
        let needle = search.to_lowercase();
        self.files
            .iter()
            .filter(|f| category.matches(&f.mime_type))
            .filter(|f| needle.is_empty() || f.name.to_lowercase().contains(&needle))
            .cloned()
            .collect()
    }
}

pub struct FileRegistry {
    store: Arc<dyn RemoteStore>,
    current: RwLock<Arc<Snapshot>>,
    /// Handed out to each refresh as it starts.
    next_generation: AtomicU64,
}

impl FileRegistry {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            current: RwLock::new(Arc::new(Snapshot::default())),
            next_generation: AtomicU64::new(1),
        }
    }

    pub fn store(&self) -> &Arc<dyn RemoteStore> {
        &self.store
    }

    /// Re-fetch files and quota concurrently and swap both in together.
    ///
    /// If either call fails the previous snapshot stays visible. When refreshes
    /// overlap, the one started last wins; an older one finishing late is
    /// dropped.
    pub async fn refresh(&self) -> ClientResult<Arc<Snapshot>> {
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);
        debug!(generation, "refreshing registry");

        let (files, quota) = match tokio::try_join!(self.store.list(), self.store.quota()) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(generation, "registry refresh failed: {}", err);
                return Err(ClientError::refresh_failed(err));
            }
        };

        let fresh = Arc::new(Snapshot {
            files,
            quota,
            generation,
        });

        let mut current = self
            .current
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if current.generation > generation {
            debug!(
                generation,
                applied = current.generation,
                "discarding stale refresh"
            );
            return Ok(current.clone());
        }
        *current = fresh.clone();
        drop(current);

        info!(
            generation,
            files = fresh.files.len(),
            used = fresh.quota.used_bytes,
            "registry refreshed"
        );
        Ok(fresh)
    }

    /// The current snapshot. Cheap; callers get a consistent files/quota pair.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    pub fn files(&self) -> Vec<FileRecord> {
        self.snapshot().files.clone()
    }

    pub fn quota(&self) -> StorageQuota {
        self.snapshot().quota
    }

    pub fn find(&self, name: &str) -> Option<FileRecord> {
        self.snapshot().files.iter().find(|f| f.name == name).cloned()
    }

    pub fn query(&self, category: Category, search: &str) -> Vec<FileRecord> {
        self.snapshot().query(category, search)
    }
}
