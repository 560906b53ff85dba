//! Arena-backed reference tree for one revision.
//!
//! Every record of a revision lives in a flat `Vec` per level and is
//! addressed by a typed index. Each parent owns a [`ChildIndex`] mapping
//! child names (or model counts) to indices, so a full lookup chain is one
//! hash lookup per level. Trees are immutable once built; replacing a
//! revision builds a new tree and swaps it in whole.

use mfm_model::{
    Detachment, DetachmentData, Enhancement, EnhancementData, EntityKind, Faction, FactionData,
    RevisionData, Rule, Unit, UnitData, Variant, VariantData, Violation,
};
use mfm_types::{DetachmentId, EnhancementId, FactionId, UnitId, VariantId};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{CatalogError, CatalogResult};

/// Children of one parent: insertion order plus a key index.
#[derive(Debug, Clone)]
struct ChildIndex<K, I> {
    order: Vec<I>,
    by_key: HashMap<K, I>,
}

impl<K, I> Default for ChildIndex<K, I> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            by_key: HashMap::new(),
        }
    }
}

impl<K: Hash + Eq, I: Copy> ChildIndex<K, I> {
    fn insert(&mut self, key: K, id: I) {
        self.order.push(id);
        self.by_key.insert(key, id);
    }

    fn get<Q>(&self, key: &Q) -> Option<I>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.by_key.get(key).copied()
    }

    fn ids(&self) -> &[I] {
        &self.order
    }

    fn keys(&self) -> impl Iterator<Item = &K> {
        self.by_key.keys()
    }
}

/// Which list of names to produce for a selection UI.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NameScope {
    /// Factions of the revision.
    Factions,
    /// Detachments of a faction.
    Detachments { faction: String },
    /// Enhancements of a detachment.
    Enhancements { faction: String, detachment: String },
    /// Units of a faction.
    Units { faction: String },
    /// Model counts offered for a unit.
    ModelCounts { faction: String, unit: String },
}

impl NameScope {
    pub fn detachments(faction: impl Into<String>) -> Self {
        Self::Detachments {
            faction: faction.into(),
        }
    }

    pub fn enhancements(faction: impl Into<String>, detachment: impl Into<String>) -> Self {
        Self::Enhancements {
            faction: faction.into(),
            detachment: detachment.into(),
        }
    }

    pub fn units(faction: impl Into<String>) -> Self {
        Self::Units {
            faction: faction.into(),
        }
    }

    pub fn model_counts(faction: impl Into<String>, unit: impl Into<String>) -> Self {
        Self::ModelCounts {
            faction: faction.into(),
            unit: unit.into(),
        }
    }
}

/// Record counts per level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub factions: usize,
    pub detachments: usize,
    pub enhancements: usize,
    pub units: usize,
    pub variants: usize,
}

/// The Faction → Detachment → Enhancement and Faction → Unit → Variant
/// hierarchy of one revision.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTree {
    factions: Vec<Faction>,
    detachments: Vec<Detachment>,
    enhancements: Vec<Enhancement>,
    units: Vec<Unit>,
    variants: Vec<Variant>,

    faction_index: ChildIndex<String, FactionId>,
    // Indexed by FactionId.
    detachment_index: Vec<ChildIndex<String, DetachmentId>>,
    unit_index: Vec<ChildIndex<String, UnitId>>,
    // Indexed by DetachmentId.
    enhancement_index: Vec<ChildIndex<String, EnhancementId>>,
    // Indexed by UnitId.
    variant_index: Vec<ChildIndex<u32, VariantId>>,
}

fn narrow(value: i64, kind: EntityKind, path: impl FnOnce() -> String) -> CatalogResult<u32> {
    u32::try_from(value).map_err(|_| {
        CatalogError::ValidationFailed(vec![Violation::new(
            kind,
            path(),
            Rule::PointsOverflow { points: value },
        )])
    })
}

fn next_slot(len: usize) -> u32 {
    // Arenas are bounded by the record count of a single import.
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl ReferenceTree {
    /// Validates `data` and builds its arena.
    ///
    /// Fails with `ValidationFailed` carrying every violation found; no
    /// tree is produced in that case.
    pub fn build(data: &RevisionData, max_name_len: usize) -> CatalogResult<Self> {
        let violations = data.validate(max_name_len);
        if !violations.is_empty() {
            return Err(CatalogError::ValidationFailed(violations));
        }

        let mut tree = Self::default();
        for faction in &data.factions {
            tree.add_faction(faction)?;
        }
        Ok(tree)
    }

    fn add_faction(&mut self, data: &FactionData) -> CatalogResult<()> {
        let id = FactionId::new(next_slot(self.factions.len()));
        self.factions.push(Faction {
            id,
            name: data.name.clone(),
            supergroup: data.supergroup.clone(),
            ally_to: data.ally_to.clone(),
        });
        self.faction_index.insert(data.name.clone(), id);
        self.detachment_index.push(ChildIndex::default());
        self.unit_index.push(ChildIndex::default());

        for detachment in &data.detachments {
            self.add_detachment(id, &data.name, detachment)?;
        }
        for unit in &data.units {
            self.add_unit(id, &data.name, unit)?;
        }
        Ok(())
    }

    fn add_detachment(
        &mut self,
        faction: FactionId,
        faction_name: &str,
        data: &DetachmentData,
    ) -> CatalogResult<()> {
        let id = DetachmentId::new(next_slot(self.detachments.len()));
        self.detachments.push(Detachment {
            id,
            faction,
            name: data.name.clone(),
        });
        self.detachment_index[faction.index()].insert(data.name.clone(), id);
        self.enhancement_index.push(ChildIndex::default());

        for EnhancementData { name, points } in &data.enhancements {
            let points = narrow(*points, EntityKind::Enhancement, || {
                Violation::path_of([faction_name, data.name.as_str(), name.as_str()])
            })?;
            let enhancement_id = EnhancementId::new(next_slot(self.enhancements.len()));
            self.enhancements.push(Enhancement {
                id: enhancement_id,
                detachment: id,
                name: name.clone(),
                points,
            });
            self.enhancement_index[id.index()].insert(name.clone(), enhancement_id);
        }
        Ok(())
    }

    fn add_unit(&mut self, faction: FactionId, faction_name: &str, data: &UnitData) -> CatalogResult<()> {
        let id = UnitId::new(next_slot(self.units.len()));
        self.units.push(Unit {
            id,
            faction,
            name: data.name.clone(),
            unit_type: data.unit_type.clone(),
        });
        self.unit_index[faction.index()].insert(data.name.clone(), id);
        self.variant_index.push(ChildIndex::default());

        for VariantData { model_count, points } in &data.variants {
            let path =
                || Violation::path_of([faction_name, data.name.as_str(), model_count.to_string().as_str()]);
            let model_count = narrow(*model_count, EntityKind::Variant, path)?;
            let points = narrow(*points, EntityKind::Variant, path)?;
            let variant_id = VariantId::new(next_slot(self.variants.len()));
            self.variants.push(Variant {
                id: variant_id,
                unit: id,
                model_count,
                points,
            });
            self.variant_index[id.index()].insert(model_count, variant_id);
        }
        Ok(())
    }

    // ── Record access by id ──────────────────────────────────────

    pub fn faction(&self, id: FactionId) -> Option<&Faction> {
        self.factions.get(id.index())
    }

    pub fn detachment(&self, id: DetachmentId) -> Option<&Detachment> {
        self.detachments.get(id.index())
    }

    pub fn enhancement(&self, id: EnhancementId) -> Option<&Enhancement> {
        self.enhancements.get(id.index())
    }

    pub fn unit(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(id.index())
    }

    pub fn variant(&self, id: VariantId) -> Option<&Variant> {
        self.variants.get(id.index())
    }

    // ── Name lookups ─────────────────────────────────────────────

    /// Finds a faction by exact, case-sensitive name.
    pub fn find_faction(&self, name: &str) -> Option<&Faction> {
        self.faction_index.get(name).and_then(|id| self.faction(id))
    }

    pub fn find_detachment(&self, faction: &str, detachment: &str) -> Option<&Detachment> {
        let faction = self.faction_index.get(faction)?;
        let id = self.detachment_index.get(faction.index())?.get(detachment)?;
        self.detachment(id)
    }

    pub fn find_enhancement(
        &self,
        faction: &str,
        detachment: &str,
        enhancement: &str,
    ) -> Option<&Enhancement> {
        let detachment = self.find_detachment(faction, detachment)?;
        let id = self
            .enhancement_index
            .get(detachment.id.index())?
            .get(enhancement)?;
        self.enhancement(id)
    }

    pub fn find_unit(&self, faction: &str, unit: &str) -> Option<&Unit> {
        let faction = self.faction_index.get(faction)?;
        let id = self.unit_index.get(faction.index())?.get(unit)?;
        self.unit(id)
    }

    pub fn find_variant(&self, faction: &str, unit: &str, model_count: u32) -> Option<&Variant> {
        let unit = self.find_unit(faction, unit)?;
        let id = self.variant_index.get(unit.id.index())?.get(&model_count)?;
        self.variant(id)
    }

    // ── Children ─────────────────────────────────────────────────

    /// Factions in import order.
    pub fn factions(&self) -> impl Iterator<Item = &Faction> {
        self.factions.iter()
    }

    /// Detachments of a faction, in import order.
    pub fn detachments_of(&self, faction: FactionId) -> impl Iterator<Item = &Detachment> {
        self.detachment_index
            .get(faction.index())
            .map(ChildIndex::ids)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.detachment(*id))
    }

    /// Enhancements of a detachment, in import order.
    pub fn enhancements_of(&self, detachment: DetachmentId) -> impl Iterator<Item = &Enhancement> {
        self.enhancement_index
            .get(detachment.index())
            .map(ChildIndex::ids)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.enhancement(*id))
    }

    /// Units of a faction, in import order.
    pub fn units_of(&self, faction: FactionId) -> impl Iterator<Item = &Unit> {
        self.unit_index
            .get(faction.index())
            .map(ChildIndex::ids)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.unit(*id))
    }

    /// Size variants of a unit, in import order.
    pub fn variants_of(&self, unit: UnitId) -> impl Iterator<Item = &Variant> {
        self.variant_index
            .get(unit.index())
            .map(ChildIndex::ids)
            .unwrap_or_default()
            .iter()
            .filter_map(|id| self.variant(*id))
    }

    /// Alphabetically sorted names (or ascending model counts) for a scope.
    ///
    /// Returns `None` if a parent named in the scope does not exist.
    pub fn list_names(&self, scope: &NameScope) -> Option<Vec<String>> {
        let mut names: Vec<String> = match scope {
            NameScope::Factions => self.faction_index.keys().cloned().collect(),
            NameScope::Detachments { faction } => {
                let faction = self.faction_index.get(faction.as_str())?;
                self.detachment_index
                    .get(faction.index())?
                    .keys()
                    .cloned()
                    .collect()
            }
            NameScope::Enhancements {
                faction,
                detachment,
            } => {
                let detachment = self.find_detachment(faction, detachment)?;
                self.enhancement_index
                    .get(detachment.id.index())?
                    .keys()
                    .cloned()
                    .collect()
            }
            NameScope::Units { faction } => {
                let faction = self.faction_index.get(faction.as_str())?;
                self.unit_index.get(faction.index())?.keys().cloned().collect()
            }
            NameScope::ModelCounts { faction, unit } => {
                let unit = self.find_unit(faction, unit)?;
                let mut counts: Vec<u32> = self
                    .variant_index
                    .get(unit.id.index())?
                    .keys()
                    .copied()
                    .collect();
                counts.sort_unstable();
                return Some(counts.into_iter().map(|c| c.to_string()).collect());
            }
        };
        names.sort();
        Some(names)
    }

    // ── Classification queries ───────────────────────────────────

    /// Factions whose supergroup matches, sorted by name.
    pub fn factions_in_supergroup(&self, supergroup: &str) -> Vec<&Faction> {
        let mut found: Vec<&Faction> = self
            .factions
            .iter()
            .filter(|f| f.supergroup.as_deref() == Some(supergroup))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Factions that may be taken as allies of `faction`, sorted by name.
    pub fn allies_of(&self, faction: &str) -> Vec<&Faction> {
        let mut found: Vec<&Faction> = self
            .factions
            .iter()
            .filter(|f| f.ally_to.as_deref() == Some(faction))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        found
    }

    /// Units of a faction carrying the given type, sorted by name.
    ///
    /// Returns `None` if the faction does not exist.
    pub fn units_of_type(&self, faction: &str, unit_type: &str) -> Option<Vec<&Unit>> {
        let faction = self.find_faction(faction)?;
        let mut found: Vec<&Unit> = self
            .units_of(faction.id)
            .filter(|u| u.unit_type.as_deref() == Some(unit_type))
            .collect();
        found.sort_by(|a, b| a.name.cmp(&b.name));
        Some(found)
    }

    // ── Whole-tree views ─────────────────────────────────────────

    pub fn stats(&self) -> TreeStats {
        TreeStats {
            factions: self.factions.len(),
            detachments: self.detachments.len(),
            enhancements: self.enhancements.len(),
            units: self.units.len(),
            variants: self.variants.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.factions.is_empty()
    }

    /// Renders the tree back into the import description, preserving
    /// import order at every level.
    pub fn to_revision_data(&self) -> RevisionData {
        let factions = self
            .factions
            .iter()
            .map(|faction| FactionData {
                name: faction.name.clone(),
                supergroup: faction.supergroup.clone(),
                ally_to: faction.ally_to.clone(),
                detachments: self
                    .detachments_of(faction.id)
                    .map(|detachment| DetachmentData {
                        name: detachment.name.clone(),
                        enhancements: self
                            .enhancements_of(detachment.id)
                            .map(|e| EnhancementData {
                                name: e.name.clone(),
                                points: i64::from(e.points),
                            })
                            .collect(),
                    })
                    .collect(),
                units: self
                    .units_of(faction.id)
                    .map(|unit| UnitData {
                        name: unit.name.clone(),
                        unit_type: unit.unit_type.clone(),
                        variants: self
                            .variants_of(unit.id)
                            .map(|v| VariantData {
                                model_count: i64::from(v.model_count),
                                points: i64::from(v.points),
                            })
                            .collect(),
                    })
                    .collect(),
            })
            .collect();
        RevisionData { factions }
    }
}
