//! Version catalog: the set of known revisions and the latest pointer.
//!
//! All state lives in an immutable [`CatalogSnapshot`] behind an
//! `RwLock<Arc<_>>`. Readers clone the `Arc` and never hold the lock while
//! walking a tree. Writers are serialized by a gate, build the next
//! snapshot off to the side, persist through the [`ReferenceStore`], and
//! only then swap the pointer. A reader therefore sees either the whole
//! old catalog or the whole new one.

use chrono::NaiveDate;
use mfm_model::{EntityKind, Rule, Version, VersionStatus, Violation};
use mfm_storage::{MemoryStore, ReferenceStore};
use mfm_types::{VersionId, VersionLabel, VersionSelector};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError, RwLock, TryLockError};
use tracing::{debug, info, warn};

use crate::config::CatalogConfig;
use crate::error::{CatalogError, CatalogResult};
use crate::tree::ReferenceTree;

/// An immutable view of every version and tree at one instant.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    /// Version records; `is_latest` is always false here and filled in on read.
    versions: HashMap<VersionId, Version>,
    by_label: HashMap<VersionLabel, VersionId>,
    trees: HashMap<VersionId, Arc<ReferenceTree>>,
    latest: Option<VersionId>,
    generation: u64,
    /// Set by mutations on a private copy; a write with nothing changed
    /// publishes no new snapshot.
    changed: bool,
}

impl CatalogSnapshot {
    /// Monotonic counter bumped by every write that changes the catalog.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    fn view(&self, version: &Version) -> Version {
        let mut view = version.clone();
        view.is_latest = self.latest == Some(version.id);
        view
    }

    /// Looks up a version by id.
    pub fn version(&self, id: &VersionId) -> Option<Version> {
        self.versions.get(id).map(|v| self.view(v))
    }

    /// Looks up a version by label.
    pub fn find_by_label(&self, label: &str) -> Option<Version> {
        let label = VersionLabel::parse(label).ok()?;
        self.by_label.get(&label).and_then(|id| self.version(id))
    }

    /// The version holding the latest pointer, active or not.
    pub fn latest(&self) -> Option<Version> {
        self.latest.and_then(|id| self.version(&id))
    }

    /// Resolves a selector to a concrete version id.
    ///
    /// Explicit labels resolve regardless of the active flag; "latest"
    /// requires the latest version to also be active.
    pub fn resolve(&self, selector: &VersionSelector) -> CatalogResult<VersionId> {
        match selector {
            VersionSelector::Exact(label) => self
                .by_label
                .get(label)
                .copied()
                .ok_or_else(|| CatalogError::VersionNotFound(label.to_string())),
            VersionSelector::Latest => self
                .latest()
                .filter(Version::serves_latest)
                .map(|v| v.id)
                .ok_or(CatalogError::NoActiveVersion),
        }
    }

    /// The tree of a version.
    pub fn tree(&self, id: &VersionId) -> Option<&Arc<ReferenceTree>> {
        self.trees.get(id)
    }

    /// Resolves a selector and returns the matching tree.
    pub fn resolve_tree(
        &self,
        selector: &VersionSelector,
    ) -> CatalogResult<(VersionId, &Arc<ReferenceTree>)> {
        let id = self.resolve(selector)?;
        let tree = self.trees.get(&id).ok_or(CatalogError::UnknownVersionId(id))?;
        Ok((id, tree))
    }

    /// Version labels in natural order, optionally only active ones.
    pub fn list(&self, active_only: bool) -> Vec<VersionLabel> {
        let mut labels: Vec<VersionLabel> = self
            .versions
            .values()
            .filter(|v| !active_only || v.is_active)
            .map(|v| v.label.clone())
            .collect();
        labels.sort();
        labels
    }

    /// Every version record, ordered by label.
    pub fn versions(&self) -> Vec<Version> {
        let mut versions: Vec<Version> = self.versions.values().map(|v| self.view(v)).collect();
        versions.sort_by(|a, b| a.label.cmp(&b.label));
        versions
    }

    // ── Mutation (only on a private copy inside a write) ─────────

    pub(crate) fn id_for_label(&self, label: &VersionLabel) -> Option<VersionId> {
        self.by_label.get(label).copied()
    }

    pub(crate) fn record(&self, id: &VersionId) -> CatalogResult<&Version> {
        self.versions.get(id).ok_or(CatalogError::UnknownVersionId(*id))
    }

    pub(crate) fn install(&mut self, mut version: Version, tree: Arc<ReferenceTree>) {
        self.changed = true;
        if version.is_latest {
            self.latest = Some(version.id);
        }
        version.is_latest = false;
        self.by_label.insert(version.label.clone(), version.id);
        self.trees.insert(version.id, tree);
        self.versions.insert(version.id, version);
    }

    pub(crate) fn replace_tree(&mut self, id: VersionId, tree: Arc<ReferenceTree>) {
        self.changed = true;
        self.trees.insert(id, tree);
    }

    fn set_latest(&mut self, id: VersionId) {
        self.changed = true;
        self.latest = Some(id);
    }

    fn update(&mut self, version: Version) {
        self.changed = true;
        let mut version = version;
        version.is_latest = false;
        self.versions.insert(version.id, version);
    }
}

/// Tracks all known revisions, which one is latest, and which are active.
pub struct VersionCatalog {
    config: CatalogConfig,
    store: Arc<dyn ReferenceStore>,
    current: RwLock<Arc<CatalogSnapshot>>,
    write_gate: Mutex<()>,
}

impl VersionCatalog {
    /// Creates an empty catalog writing through to `store`.
    ///
    /// Anything already in the store is ignored; use [`VersionCatalog::open`]
    /// to load it.
    pub fn new(store: Arc<dyn ReferenceStore>, config: CatalogConfig) -> Self {
        Self {
            config,
            store,
            current: RwLock::new(Arc::new(CatalogSnapshot::default())),
            write_gate: Mutex::new(()),
        }
    }

    /// Creates an empty catalog backed by a [`MemoryStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()), CatalogConfig::default())
    }

    /// Loads every version and tree from `store`.
    pub fn open(store: Arc<dyn ReferenceStore>, config: CatalogConfig) -> CatalogResult<Self> {
        let mut snapshot = CatalogSnapshot::default();
        for version in store.load_versions()? {
            let data = store.load_revision(&version.id)?;
            let tree = ReferenceTree::build(&data, config.max_name_len)?;
            let mut version = version;
            if version.is_latest && snapshot.latest.is_some() {
                warn!(version = %version.label, "Store reports more than one latest version; ignoring");
                version.is_latest = false;
            }
            snapshot.install(version, Arc::new(tree));
        }
        info!(
            versions = snapshot.len(),
            latest = ?snapshot.latest().map(|v| v.label.to_string()),
            "Catalog loaded from store"
        );

        let catalog = Self::new(store, config);
        *catalog.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        Ok(catalog)
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// The current snapshot. Holding it pins that state for as long as needed.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Runs one serialized write against a private copy of the snapshot and
    /// publishes it if `apply` succeeds and changed something.
    ///
    /// `apply` must persist through the store before returning `Ok`; any
    /// error discards the copy and leaves the catalog as it was. The
    /// generation only moves when a new snapshot is published.
    pub(crate) fn write<T>(
        &self,
        operation: &'static str,
        apply: impl FnOnce(&mut CatalogSnapshot, &dyn ReferenceStore) -> CatalogResult<T>,
    ) -> CatalogResult<T> {
        let _gate = match self.write_gate.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => {
                warn!(operation, "Catalog write collided with another in-flight write");
                return Err(CatalogError::ConcurrentModification);
            }
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };

        let mut next = CatalogSnapshot::clone(&self.snapshot());
        let result = apply(&mut next, self.store.as_ref());
        match result {
            Ok(value) if !next.changed => {
                debug!(operation, "Catalog write changed nothing");
                Ok(value)
            }
            Ok(value) => {
                next.changed = false;
                next.generation += 1;
                let generation = next.generation;
                *self.current.write().unwrap_or_else(PoisonError::into_inner) = Arc::new(next);
                debug!(operation, generation, "Catalog snapshot swapped");
                Ok(value)
            }
            Err(e) => {
                if matches!(e, CatalogError::Storage(_)) {
                    warn!(operation, error = %e, "Catalog write failed in store");
                }
                Err(e)
            }
        }
    }

    // ── Queries ──────────────────────────────────────────────────

    /// Resolves a selector to a concrete version id.
    pub fn resolve(&self, selector: &VersionSelector) -> CatalogResult<VersionId> {
        self.snapshot().resolve(selector)
    }

    /// Version labels in natural order, optionally only active ones.
    pub fn list(&self, active_only: bool) -> Vec<VersionLabel> {
        self.snapshot().list(active_only)
    }

    pub fn get(&self, id: &VersionId) -> Option<Version> {
        self.snapshot().version(id)
    }

    pub fn find_by_label(&self, label: &str) -> Option<Version> {
        self.snapshot().find_by_label(label)
    }

    /// The version holding the latest pointer, active or not.
    pub fn latest(&self) -> Option<Version> {
        self.snapshot().latest()
    }

    pub fn tree(&self, id: &VersionId) -> Option<Arc<ReferenceTree>> {
        self.snapshot().tree(id).cloned()
    }

    // ── Mutations ────────────────────────────────────────────────

    /// Registers a new, empty, published version.
    pub fn register(&self, label: &str, release_date: NaiveDate) -> CatalogResult<VersionId> {
        let label = parse_label(label)?;
        self.write("register", |state, store| {
            if state.id_for_label(&label).is_some() {
                return Err(CatalogError::DuplicateVersion(label));
            }
            let version = Version::new(label, release_date, VersionStatus::Published);
            let tree = ReferenceTree::default();
            store.write_revision(&version, &tree.to_revision_data())?;
            info!(version = %version.label, id = %version.id, "Version registered");
            let id = version.id;
            state.install(version, Arc::new(tree));
            Ok(id)
        })
    }

    /// Moves the latest pointer to `id`.
    ///
    /// The previous holder loses it in the same swap. Marking a draft
    /// latest publishes it when the config allows, and fails otherwise.
    pub fn mark_latest(&self, id: VersionId) -> CatalogResult<()> {
        let publish_drafts = self.config.publish_on_mark_latest;
        self.write("mark_latest", |state, store| {
            let mut version = state.record(&id)?.clone();
            if state.latest == Some(id) {
                return Ok(());
            }

            if version.is_draft() {
                if !publish_drafts {
                    return Err(CatalogError::ValidationFailed(vec![Violation::new(
                        EntityKind::Version,
                        version.label.to_string(),
                        Rule::VersionState {
                            reason: "draft versions must be published before they can be latest"
                                .into(),
                        },
                    )]));
                }
                // Publish and take the pointer in one store transaction.
                version.status = VersionStatus::Published;
                version.is_latest = true;
                let data = state
                    .tree(&id)
                    .map(|t| t.to_revision_data())
                    .unwrap_or_default();
                store.write_revision(&version, &data)?;
            } else {
                store.swap_latest(&id)?;
            }

            if !version.is_active {
                warn!(version = %version.label, "Inactive version marked latest; \"latest\" will not resolve until it is reactivated");
            }
            let previous = state.latest.and_then(|p| state.versions.get(&p)).map(|v| v.label.to_string());
            info!(version = %version.label, ?previous, "Latest version changed");
            state.update(version);
            state.set_latest(id);
            Ok(())
        })
    }

    /// Promotes a draft to published. Publishing a published version is a no-op.
    pub fn publish(&self, id: VersionId) -> CatalogResult<()> {
        self.write("publish", |state, store| {
            let mut version = state.record(&id)?.clone();
            if !version.is_draft() {
                return Ok(());
            }
            version.status = VersionStatus::Published;
            store.save_version(&version)?;
            info!(version = %version.label, "Version published");
            state.update(version);
            Ok(())
        })
    }

    /// Removes a version from "latest" resolution without deleting it.
    ///
    /// The latest pointer stays where it is, so deactivating the latest
    /// version makes "latest" fail with `NoActiveVersion`.
    pub fn deactivate(&self, id: VersionId) -> CatalogResult<()> {
        self.set_active(id, false)
    }

    pub fn reactivate(&self, id: VersionId) -> CatalogResult<()> {
        self.set_active(id, true)
    }

    fn set_active(&self, id: VersionId, active: bool) -> CatalogResult<()> {
        let operation = if active { "reactivate" } else { "deactivate" };
        self.write(operation, |state, store| {
            let mut version = state.record(&id)?.clone();
            if version.is_active == active {
                return Ok(());
            }
            version.is_active = active;
            store.save_version(&version)?;
            info!(version = %version.label, active, "Version active flag changed");
            state.update(version);
            Ok(())
        })
    }
}

pub(crate) fn parse_label(label: &str) -> CatalogResult<VersionLabel> {
    VersionLabel::parse(label).map_err(|e| {
        let rule = match e {
            mfm_types::Error::ReservedLabel(label) => Rule::ReservedVersionLabel { label },
            _ => Rule::EmptyVersionLabel,
        };
        CatalogError::ValidationFailed(vec![Violation::new(EntityKind::Version, "", rule)])
    })
}
