use mfm_model::{RevisionData, Version};
use mfm_types::VersionId;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use crate::{ReferenceStore, StorageError, StorageResult};

#[derive(Default)]
struct Inner {
    versions: HashMap<VersionId, Version>,
    revisions: HashMap<VersionId, RevisionData>,
}

/// A [`ReferenceStore`] that keeps everything in process memory.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of versions stored.
    pub fn version_count(&self) -> usize {
        self.lock().versions.len()
    }
}

impl ReferenceStore for MemoryStore {
    fn load_versions(&self) -> StorageResult<Vec<Version>> {
        Ok(self.lock().versions.values().cloned().collect())
    }

    fn load_revision(&self, id: &VersionId) -> StorageResult<RevisionData> {
        let inner = self.lock();
        if !inner.versions.contains_key(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        Ok(inner.revisions.get(id).cloned().unwrap_or_default())
    }

    fn write_revision(&self, version: &Version, data: &RevisionData) -> StorageResult<()> {
        let mut inner = self.lock();
        let mut stored = version.clone();
        if version.is_latest {
            for v in inner.versions.values_mut() {
                v.is_latest = false;
            }
        } else {
            stored.is_latest = inner.versions.get(&version.id).is_some_and(|v| v.is_latest);
        }
        inner.versions.insert(version.id, stored);
        inner.revisions.insert(version.id, data.clone());
        debug!(version = %version.label, "Stored revision in memory");
        Ok(())
    }

    fn save_version(&self, version: &Version) -> StorageResult<()> {
        let mut inner = self.lock();
        let latest = inner
            .versions
            .get(&version.id)
            .map(|v| v.is_latest)
            .unwrap_or(false);
        let mut stored = version.clone();
        stored.is_latest = latest;
        inner.versions.insert(version.id, stored);
        Ok(())
    }

    fn swap_latest(&self, id: &VersionId) -> StorageResult<()> {
        let mut inner = self.lock();
        if !inner.versions.contains_key(id) {
            return Err(StorageError::NotFound(id.to_string()));
        }
        for (vid, v) in inner.versions.iter_mut() {
            v.is_latest = vid == id;
        }
        Ok(())
    }
}
