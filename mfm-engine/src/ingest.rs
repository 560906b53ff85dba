//! Installs whole revisions atomically.
//!
//! The new tree is validated and built before the catalog's write gate is
//! taken, so the exclusive section is only the duplicate check, one store
//! transaction and a pointer swap.

use chrono::NaiveDate;
use mfm_model::{EntityKind, RevisionData, Rule, Version, VersionStatus, Violation};
use mfm_types::VersionId;
use std::sync::Arc;
use tracing::info;

use crate::catalog::{parse_label, VersionCatalog};
use crate::error::{CatalogError, CatalogResult};
use crate::tree::ReferenceTree;

/// A complete revision to install.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub label: String,
    pub release_date: NaiveDate,
    pub data: RevisionData,
    /// Take the latest pointer once installed.
    pub mark_latest: bool,
    /// Install as an unpublished draft.
    pub draft: bool,
    /// If the label names an existing draft, replace its tree in place.
    pub replace_draft: bool,
}

impl ImportRequest {
    pub fn new(label: impl Into<String>, release_date: NaiveDate, data: RevisionData) -> Self {
        Self {
            label: label.into(),
            release_date,
            data,
            mark_latest: false,
            draft: false,
            replace_draft: false,
        }
    }

    pub fn with_mark_latest(mut self, mark_latest: bool) -> Self {
        self.mark_latest = mark_latest;
        self
    }

    pub fn as_draft(mut self) -> Self {
        self.draft = true;
        self
    }

    pub fn replacing_draft(mut self) -> Self {
        self.replace_draft = true;
        self
    }
}

/// Builds reference trees and registers them with a [`VersionCatalog`].
pub struct RevisionIngestor {
    catalog: Arc<VersionCatalog>,
}

impl RevisionIngestor {
    pub fn new(catalog: Arc<VersionCatalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Arc<VersionCatalog> {
        &self.catalog
    }

    /// Installs a revision as a new version, or over an existing draft.
    ///
    /// All-or-nothing: on any validation, duplicate or store failure the
    /// catalog is unchanged.
    pub fn import_revision(&self, request: ImportRequest) -> CatalogResult<VersionId> {
        let config = self.catalog.config().clone();
        let label = parse_label(&request.label)?;
        let tree = Arc::new(ReferenceTree::build(&request.data, config.max_name_len)?);
        let stats = tree.stats();

        let ImportRequest {
            release_date,
            data,
            mark_latest,
            draft,
            replace_draft,
            ..
        } = request;

        let mut status = if draft {
            VersionStatus::Draft
        } else {
            VersionStatus::Published
        };
        if mark_latest && draft {
            if !config.publish_on_mark_latest {
                return Err(CatalogError::ValidationFailed(vec![Violation::new(
                    EntityKind::Version,
                    label.to_string(),
                    Rule::VersionState {
                        reason: "a draft import cannot be marked latest".into(),
                    },
                )]));
            }
            status = VersionStatus::Published;
        }

        self.catalog.write("import_revision", move |state, store| {
            let (id, is_active, replaced) = match state.id_for_label(&label) {
                None => (VersionId::new(), true, false),
                Some(existing) => {
                    let current = state.record(&existing)?;
                    if !(current.is_draft() && replace_draft && config.allow_draft_replace) {
                        return Err(CatalogError::DuplicateVersion(label));
                    }
                    (existing, current.is_active, true)
                }
            };

            let version = Version {
                id,
                label,
                release_date,
                status,
                is_active,
                is_latest: mark_latest,
            };
            store.write_revision(&version, &data)?;

            info!(
                version = %version.label,
                id = %id,
                status = version.status.as_str(),
                replaced,
                latest = mark_latest,
                factions = stats.factions,
                units = stats.units,
                variants = stats.variants,
                enhancements = stats.enhancements,
                "Revision imported"
            );
            state.install(version, tree);
            Ok(id)
        })
    }

    /// Replaces the whole tree of an existing draft.
    ///
    /// Published revisions are immutable and fail with `ValidationFailed`.
    /// Concurrent readers see either the old tree or the new one, never a
    /// mix. Version flags and the latest pointer are untouched.
    pub fn replace_revision(&self, id: VersionId, data: RevisionData) -> CatalogResult<()> {
        let max_name_len = self.catalog.config().max_name_len;
        let tree = Arc::new(ReferenceTree::build(&data, max_name_len)?);
        let stats = tree.stats();

        self.catalog.write("replace_revision", move |state, store| {
            let version = state.record(&id)?.clone();
            if !version.is_draft() {
                return Err(CatalogError::ValidationFailed(vec![Violation::new(
                    EntityKind::Version,
                    version.label.to_string(),
                    Rule::VersionState {
                        reason: "published versions are immutable".into(),
                    },
                )]));
            }
            store.write_revision(&version, &data)?;
            info!(
                version = %version.label,
                factions = stats.factions,
                units = stats.units,
                "Revision replaced"
            );
            state.replace_tree(id, tree);
            Ok(())
        })
    }
}
