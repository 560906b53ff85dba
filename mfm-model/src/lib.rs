//! Reference data model for the points manual catalog.
//!
//! Defines the types every layer agrees on:
//! - [`Version`]: one revision of the manual and its lifecycle flags
//! - [`Faction`], [`Detachment`], [`Enhancement`], [`Unit`], [`Variant`]:
//!   the immutable records stored in a revision's arena
//! - [`RevisionData`]: the nested description an import tool hands in
//! - [`Violation`] / [`Rule`]: what validation reports back to the operator
//!
//! These types carry no behaviour beyond construction, serialization and
//! validation; indexing and lookup belong to `mfm-engine`.

mod records;
mod revision;
mod validate;
mod version;

pub use records::{Detachment, Enhancement, Faction, Unit, Variant};
pub use revision::{DetachmentData, EnhancementData, FactionData, RevisionData, UnitData, VariantData};
pub use validate::{EntityKind, Rule, Violation, DEFAULT_MAX_NAME_LEN};
pub use version::{Version, VersionStatus};
