//! Core type definitions for the points manual catalog.
//!
//! This crate defines the small, dependency-light types every other crate
//! agrees on:
//! - Version identifiers (UUID v7) and per-revision arena indices
//! - Version labels (`"2025.1"`) with their natural ordering
//! - Version selectors (an explicit label or "latest")
//!
//! Reference records (factions, units, ...) live in `mfm-model`.

mod ids;
mod label;
mod selector;

pub use ids::{DetachmentId, EnhancementId, FactionId, UnitId, VariantId, VersionId};
pub use label::VersionLabel;
pub use selector::VersionSelector;

/// Result type alias using the crate's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in type operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid UUID: {0}")]
    InvalidUuid(#[from] uuid::Error),

    #[error("invalid version label: {0:?}")]
    InvalidLabel(String),

    #[error("version label {0:?} is reserved for the latest selector")]
    ReservedLabel(String),
}
