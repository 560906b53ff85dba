//! The nested description of one revision, as supplied by an import tool.
//!
//! Numbers are kept wide and signed here so bad source data (negative
//! costs, zero-model variants) surfaces as a validation violation with a
//! path instead of a deserialization error.

use serde::{Deserialize, Serialize};

/// Every faction of one revision, with their full subtrees.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionData {
    #[serde(default)]
    pub factions: Vec<FactionData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactionData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supergroup: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ally_to: Option<String>,
    #[serde(default)]
    pub detachments: Vec<DetachmentData>,
    #[serde(default)]
    pub units: Vec<UnitData>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetachmentData {
    pub name: String,
    #[serde(default)]
    pub enhancements: Vec<EnhancementData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnhancementData {
    pub name: String,
    pub points: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitData {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_type: Option<String>,
    #[serde(default)]
    pub variants: Vec<VariantData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantData {
    pub model_count: i64,
    pub points: i64,
}

impl RevisionData {
    pub fn new(factions: Vec<FactionData>) -> Self {
        Self { factions }
    }

    /// Parses a revision from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serializes the revision to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Total number of records the revision would create.
    pub fn record_count(&self) -> usize {
        self.factions
            .iter()
            .map(|f| {
                1 + f
                    .detachments
                    .iter()
                    .map(|d| 1 + d.enhancements.len())
                    .sum::<usize>()
                    + f.units.iter().map(|u| 1 + u.variants.len()).sum::<usize>()
            })
            .sum()
    }
}

impl FactionData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_supergroup(mut self, supergroup: impl Into<String>) -> Self {
        self.supergroup = Some(supergroup.into());
        self
    }

    pub fn with_ally_to(mut self, ally_to: impl Into<String>) -> Self {
        self.ally_to = Some(ally_to.into());
        self
    }

    pub fn with_detachment(mut self, detachment: DetachmentData) -> Self {
        self.detachments.push(detachment);
        self
    }

    pub fn with_unit(mut self, unit: UnitData) -> Self {
        self.units.push(unit);
        self
    }
}

impl DetachmentData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            enhancements: Vec::new(),
        }
    }

    pub fn with_enhancement(mut self, name: impl Into<String>, points: i64) -> Self {
        self.enhancements.push(EnhancementData {
            name: name.into(),
            points,
        });
        self
    }
}

impl UnitData {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_unit_type(mut self, unit_type: impl Into<String>) -> Self {
        self.unit_type = Some(unit_type.into());
        self
    }

    pub fn with_variant(mut self, model_count: i64, points: i64) -> Self {
        self.variants.push(VariantData { model_count, points });
        self
    }
}
