use chrono::NaiveDate;
use mfm_types::{VersionId, VersionLabel};
use serde::{Deserialize, Serialize};

/// Publication state of a revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionStatus {
    /// Imported but not released; its tree may still be replaced by re-import.
    Draft,
    /// Released; the label is final.
    Published,
}

impl VersionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Published => "published",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(Self::Draft),
            "published" => Some(Self::Published),
            _ => None,
        }
    }
}

/// One revision of the points manual.
///
/// `is_latest` is a view of the catalog's latest pointer at the time the
/// record was read; at most one version carries it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Version {
    pub id: VersionId,
    pub label: VersionLabel,
    pub release_date: NaiveDate,
    pub status: VersionStatus,
    pub is_active: bool,
    pub is_latest: bool,
}

impl Version {
    /// A freshly imported, active, non-latest revision.
    pub fn new(label: VersionLabel, release_date: NaiveDate, status: VersionStatus) -> Self {
        Self {
            id: VersionId::new(),
            label,
            release_date,
            status,
            is_active: true,
            is_latest: false,
        }
    }

    #[must_use]
    pub fn is_draft(&self) -> bool {
        self.status == VersionStatus::Draft
    }

    /// True if this revision may answer a "latest" lookup.
    #[must_use]
    pub fn serves_latest(&self) -> bool {
        self.is_latest && self.is_active
    }
}
