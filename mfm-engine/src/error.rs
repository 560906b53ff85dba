//! Error types for the catalog engine.

use mfm_model::Violation;
use mfm_storage::StorageError;
use mfm_types::{VersionId, VersionLabel};
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A name in the lookup chain does not exist.
    #[error("not found")]
    NotFound,

    /// No version carries the requested label.
    #[error("version not found: {0}")]
    VersionNotFound(String),

    /// No version has the given id.
    #[error("unknown version id: {0}")]
    UnknownVersionId(VersionId),

    /// The label is already registered and cannot be replaced.
    #[error("version already registered: {0}")]
    DuplicateVersion(VersionLabel),

    /// The import or operation broke one or more rules.
    #[error("validation failed: {}", summarize(.0))]
    ValidationFailed(Vec<Violation>),

    /// "latest" was requested but no active version is marked latest.
    #[error("no active version is marked latest")]
    NoActiveVersion,

    /// Another write holds the catalog.
    #[error("another catalog write is in progress")]
    ConcurrentModification,

    /// The backing store failed; the catalog was left unchanged.
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

impl CatalogError {
    /// True for every "no price available" outcome: a broken name chain or
    /// an unknown version label.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound | Self::VersionNotFound(_))
    }

    /// The violations behind a `ValidationFailed`, empty otherwise.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::ValidationFailed(violations) => violations,
            _ => &[],
        }
    }
}

fn summarize(violations: &[Violation]) -> String {
    match violations {
        [] => "no details".to_string(),
        [only] => only.to_string(),
        [first, rest @ ..] => format!("{first} (and {} more)", rest.len()),
    }
}
