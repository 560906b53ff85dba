//! Versioned points resolution for the points manual catalog.
//!
//! # Components
//!
//! - [`VersionCatalog`]: every known revision, the latest pointer and the
//!   active flags, held as an immutable snapshot swapped on write
//! - [`ReferenceTree`]: one revision's Faction/Detachment/Enhancement and
//!   Faction/Unit/Variant hierarchy in flat arenas with per-parent name indices
//! - [`PointsResolver`]: name-chain lookups at a label or at "latest"
//! - [`RevisionIngestor`]: validated, all-or-nothing install and replacement
//!   of whole revisions
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use chrono::NaiveDate;
//! use mfm_engine::{ImportRequest, PointsResolver, RevisionIngestor, VersionCatalog};
//! use mfm_model::{FactionData, RevisionData, UnitData};
//! use mfm_types::VersionSelector;
//!
//! let catalog = Arc::new(VersionCatalog::in_memory());
//! let ingestor = RevisionIngestor::new(catalog.clone());
//! let data = RevisionData::new(vec![
//!     FactionData::new("Orks").with_unit(UnitData::new("Boyz").with_variant(10, 120)),
//! ]);
//! let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
//! ingestor
//!     .import_revision(ImportRequest::new("2025.1", date, data).with_mark_latest(true))
//!     .unwrap();
//!
//! let resolver = PointsResolver::new(catalog);
//! let points = resolver
//!     .resolve_unit_variant_points("Orks", "Boyz", 10, &VersionSelector::Latest)
//!     .unwrap();
//! assert_eq!(points, 120);
//! ```

mod catalog;
mod config;
mod error;
mod ingest;
mod resolver;
mod tree;

pub use catalog::{CatalogSnapshot, VersionCatalog};
pub use config::CatalogConfig;
pub use error::{CatalogError, CatalogResult};
pub use ingest::{ImportRequest, RevisionIngestor};
pub use resolver::{BatchPricing, PointsResolver, PriceQuery};
pub use tree::{NameScope, ReferenceTree, TreeStats};
