use mfm_model::{RevisionData, Version};
use mfm_types::VersionId;

use crate::StorageResult;

/// Durable storage for versions and their reference subtrees.
///
/// Every method is a single transaction: it either fully applies or
/// leaves the store untouched.
pub trait ReferenceStore: Send + Sync {
    /// Loads every stored version, in no particular order.
    fn load_versions(&self) -> StorageResult<Vec<Version>>;

    /// Loads the subtree of one version.
    fn load_revision(&self, id: &VersionId) -> StorageResult<RevisionData>;

    /// Upserts the version row and replaces its whole subtree.
    ///
    /// If `version.is_latest` is set, the latest marker moves to this
    /// version within the same transaction.
    fn write_revision(&self, version: &Version, data: &RevisionData) -> StorageResult<()>;

    /// Upserts the version row only (status and active flag).
    fn save_version(&self, version: &Version) -> StorageResult<()>;

    /// Moves the latest marker to `id`, clearing it everywhere else.
    fn swap_latest(&self, id: &VersionId) -> StorageResult<()>;
}
