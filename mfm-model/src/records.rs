use mfm_types::{DetachmentId, EnhancementId, FactionId, UnitId, VariantId};
use serde::{Deserialize, Serialize};

/// Top-level army grouping within a revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faction {
    pub id: FactionId,
    pub name: String,
    /// Broader grouping the faction belongs to (e.g. "Imperium").
    pub supergroup: Option<String>,
    /// Faction this one may be taken as allies of.
    pub ally_to: Option<String>,
}

/// An army-build option within a faction that grants access to enhancements.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Detachment {
    pub id: DetachmentId,
    pub faction: FactionId,
    pub name: String,
}

/// A named upgrade with a fixed cost, scoped to a detachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enhancement {
    pub id: EnhancementId,
    pub detachment: DetachmentId,
    pub name: String,
    pub points: u32,
}

/// A unit datasheet within a faction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub faction: FactionId,
    pub name: String,
    /// Battlefield role or keyword classification ("Battleline", "Character", ...).
    pub unit_type: Option<String>,
}

/// One model-count configuration of a unit and its cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    pub unit: UnitId,
    pub model_count: u32,
    pub points: u32,
}
