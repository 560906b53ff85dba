//! Points resolution over the catalog.
//!
//! Every call pins one catalog snapshot, resolves the selector against it
//! and walks the name chain. Any missing hop yields `NotFound`; there is no
//! fallback to another version.

use mfm_types::{VersionId, VersionSelector};
use std::sync::Arc;
use tracing::debug;

use crate::catalog::VersionCatalog;
use crate::error::{CatalogError, CatalogResult};
use crate::tree::{NameScope, ReferenceTree};

/// One item to price.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PriceQuery {
    Unit {
        faction: String,
        unit: String,
        model_count: u32,
    },
    Enhancement {
        faction: String,
        detachment: String,
        enhancement: String,
    },
}

impl PriceQuery {
    pub fn unit(faction: impl Into<String>, unit: impl Into<String>, model_count: u32) -> Self {
        Self::Unit {
            faction: faction.into(),
            unit: unit.into(),
            model_count,
        }
    }

    pub fn enhancement(
        faction: impl Into<String>,
        detachment: impl Into<String>,
        enhancement: impl Into<String>,
    ) -> Self {
        Self::Enhancement {
            faction: faction.into(),
            detachment: detachment.into(),
            enhancement: enhancement.into(),
        }
    }

    fn price(&self, tree: &ReferenceTree) -> Option<u32> {
        match self {
            Self::Unit {
                faction,
                unit,
                model_count,
            } => tree
                .find_variant(faction, unit, *model_count)
                .map(|v| v.points),
            Self::Enhancement {
                faction,
                detachment,
                enhancement,
            } => tree
                .find_enhancement(faction, detachment, enhancement)
                .map(|e| e.points),
        }
    }
}

/// Prices for a batch of queries, all taken from the same revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchPricing {
    pub version: VersionId,
    /// Catalog generation the batch was read from.
    pub generation: u64,
    /// One entry per query, in query order.
    pub points: Vec<Option<u32>>,
}

impl BatchPricing {
    /// Sum of all prices, or `None` if any query was not found.
    pub fn total(&self) -> Option<u64> {
        self.points
            .iter()
            .try_fold(0u64, |acc, p| p.map(|p| acc + u64::from(p)))
    }

    /// Sum of the prices that were found.
    pub fn found_total(&self) -> u64 {
        self.points.iter().flatten().map(|p| u64::from(*p)).sum()
    }

    /// Indices of queries with no price.
    pub fn missing(&self) -> Vec<usize> {
        self.points
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_none())
            .map(|(i, _)| i)
            .collect()
    }
}

/// Resolves point costs by name at a given revision.
#[derive(Clone)]
pub struct PointsResolver {
    catalog: Arc<VersionCatalog>,
}

impl PointsResolver {
    pub fn new(catalog: Arc<VersionCatalog>) -> Self {
        Self { catalog }
    }

    /// Points for `unit` fielded with `model_count` models.
    pub fn resolve_unit_variant_points(
        &self,
        faction: &str,
        unit: &str,
        model_count: u32,
        selector: &VersionSelector,
    ) -> CatalogResult<u32> {
        let snapshot = self.catalog.snapshot();
        let (_, tree) = snapshot.resolve_tree(selector)?;
        tree.find_variant(faction, unit, model_count)
            .map(|v| v.points)
            .ok_or_else(|| {
                debug!(faction, unit, model_count, %selector, "No unit price");
                CatalogError::NotFound
            })
    }

    /// Points for an enhancement of a detachment.
    pub fn resolve_enhancement_points(
        &self,
        faction: &str,
        detachment: &str,
        enhancement: &str,
        selector: &VersionSelector,
    ) -> CatalogResult<u32> {
        let snapshot = self.catalog.snapshot();
        let (_, tree) = snapshot.resolve_tree(selector)?;
        tree.find_enhancement(faction, detachment, enhancement)
            .map(|e| e.points)
            .ok_or_else(|| {
                debug!(faction, detachment, enhancement, %selector, "No enhancement price");
                CatalogError::NotFound
            })
    }

    /// Prices every query against one revision of one snapshot.
    ///
    /// Only version resolution can fail the batch; individual misses come
    /// back as `None`.
    pub fn resolve_batch(
        &self,
        selector: &VersionSelector,
        queries: &[PriceQuery],
    ) -> CatalogResult<BatchPricing> {
        let snapshot = self.catalog.snapshot();
        let (version, tree) = snapshot.resolve_tree(selector)?;
        Ok(BatchPricing {
            version,
            generation: snapshot.generation(),
            points: queries.iter().map(|q| q.price(tree)).collect(),
        })
    }

    /// Sorted names for a selection UI at the selected revision.
    pub fn list_names(
        &self,
        selector: &VersionSelector,
        scope: &NameScope,
    ) -> CatalogResult<Vec<String>> {
        let snapshot = self.catalog.snapshot();
        let (_, tree) = snapshot.resolve_tree(selector)?;
        tree.list_names(scope).ok_or(CatalogError::NotFound)
    }
}
