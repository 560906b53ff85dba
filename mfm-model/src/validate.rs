//! Structural validation of a revision before it is installed.
//!
//! Validation never stops at the first problem: the operator fixing the
//! source spreadsheet wants the whole list in one pass.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::HashSet;
use std::fmt;

use crate::revision::{FactionData, RevisionData, UnitData};

/// Names longer than this are rejected unless the caller picks another limit.
pub const DEFAULT_MAX_NAME_LEN: usize = 128;

/// Which level of the hierarchy a violation was found at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Version,
    Faction,
    Detachment,
    Enhancement,
    Unit,
    Variant,
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Version => "version",
            Self::Faction => "faction",
            Self::Detachment => "detachment",
            Self::Enhancement => "enhancement",
            Self::Unit => "unit",
            Self::Variant => "variant",
        };
        f.write_str(s)
    }
}

/// The rule a record broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "rule")]
pub enum Rule {
    EmptyName,
    NameTooLong { max: usize },
    DuplicateName { name: String },
    NegativePoints { points: i64 },
    PointsOverflow { points: i64 },
    InvalidModelCount { model_count: i64 },
    DuplicateModelCount { model_count: i64 },
    UnitWithoutVariants,
    EmptyVersionLabel,
    /// The label would be read as the "latest" selector.
    ReservedVersionLabel { label: String },
    /// The version is in a state the requested operation does not accept.
    VersionState { reason: String },
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => f.write_str("name is empty"),
            Self::NameTooLong { max } => write!(f, "name longer than {max} characters"),
            Self::DuplicateName { name } => write!(f, "duplicate name {name:?} under the same parent"),
            Self::NegativePoints { points } => write!(f, "negative points value {points}"),
            Self::PointsOverflow { points } => write!(f, "points value {points} out of range"),
            Self::InvalidModelCount { model_count } => {
                write!(f, "model count {model_count} must be a positive integer")
            }
            Self::DuplicateModelCount { model_count } => {
                write!(f, "model count {model_count} listed more than once")
            }
            Self::UnitWithoutVariants => f.write_str("unit has no size variants"),
            Self::EmptyVersionLabel => f.write_str("version label is empty"),
            Self::ReservedVersionLabel { label } => {
                write!(f, "version label {label:?} is reserved for the latest selector")
            }
            Self::VersionState { reason } => f.write_str(reason),
        }
    }
}

/// One broken rule, located by its name path (`"Orks/Boyz/10"`).
///
/// Segments are joined with `/`; a `/` or `%` inside a name is written as
/// `%2F` or `%25` so every path names exactly one record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    pub kind: EntityKind,
    pub path: String,
    pub rule: Rule,
}

impl Violation {
    pub fn new(kind: EntityKind, path: impl Into<String>, rule: Rule) -> Self {
        Self {
            kind,
            path: path.into(),
            rule,
        }
    }

    /// Builds a path from raw name segments.
    pub fn path_of<'a>(segments: impl IntoIterator<Item = &'a str>) -> String {
        segments
            .into_iter()
            .fold(String::new(), |parent, segment| join(&parent, segment))
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}: {}", self.kind, self.rule)
        } else {
            write!(f, "{} {:?}: {}", self.kind, self.path, self.rule)
        }
    }
}

struct Checker {
    max_name_len: usize,
    violations: Vec<Violation>,
}

impl Checker {
    fn name(&mut self, kind: EntityKind, path: &str, name: &str) {
        if name.trim().is_empty() {
            self.violations.push(Violation::new(kind, path, Rule::EmptyName));
        } else if name.chars().count() > self.max_name_len {
            self.violations.push(Violation::new(
                kind,
                path,
                Rule::NameTooLong {
                    max: self.max_name_len,
                },
            ));
        }
    }

    fn unique<'a>(&mut self, kind: EntityKind, parent: &str, names: impl Iterator<Item = &'a str>) {
        let mut seen = HashSet::new();
        let mut reported = HashSet::new();
        for name in names {
            if !seen.insert(name) && reported.insert(name) {
                self.violations.push(Violation::new(
                    kind,
                    join(parent, name),
                    Rule::DuplicateName {
                        name: name.to_string(),
                    },
                ));
            }
        }
    }

    fn points(&mut self, kind: EntityKind, path: &str, points: i64) {
        if points < 0 {
            self.violations
                .push(Violation::new(kind, path, Rule::NegativePoints { points }));
        } else if u32::try_from(points).is_err() {
            self.violations
                .push(Violation::new(kind, path, Rule::PointsOverflow { points }));
        }
    }

    fn faction(&mut self, faction: &FactionData) {
        let path = &escape(&faction.name);
        self.name(EntityKind::Faction, path, &faction.name);

        self.unique(
            EntityKind::Detachment,
            path,
            faction.detachments.iter().map(|d| d.name.as_str()),
        );
        for detachment in &faction.detachments {
            let d_path = join(path, &detachment.name);
            self.name(EntityKind::Detachment, &d_path, &detachment.name);
            self.unique(
                EntityKind::Enhancement,
                &d_path,
                detachment.enhancements.iter().map(|e| e.name.as_str()),
            );
            for enhancement in &detachment.enhancements {
                let e_path = join(&d_path, &enhancement.name);
                self.name(EntityKind::Enhancement, &e_path, &enhancement.name);
                self.points(EntityKind::Enhancement, &e_path, enhancement.points);
            }
        }

        self.unique(
            EntityKind::Unit,
            path,
            faction.units.iter().map(|u| u.name.as_str()),
        );
        for unit in &faction.units {
            self.unit(path, unit);
        }
    }

    fn unit(&mut self, faction_path: &str, unit: &UnitData) {
        let path = join(faction_path, &unit.name);
        self.name(EntityKind::Unit, &path, &unit.name);
        if unit.variants.is_empty() {
            self.violations
                .push(Violation::new(EntityKind::Unit, &path, Rule::UnitWithoutVariants));
        }

        let mut counts = HashSet::new();
        let mut reported = HashSet::new();
        for variant in &unit.variants {
            let v_path = join(&path, &variant.model_count.to_string());
            if variant.model_count <= 0 || u32::try_from(variant.model_count).is_err() {
                self.violations.push(Violation::new(
                    EntityKind::Variant,
                    &v_path,
                    Rule::InvalidModelCount {
                        model_count: variant.model_count,
                    },
                ));
            } else if !counts.insert(variant.model_count) && reported.insert(variant.model_count) {
                self.violations.push(Violation::new(
                    EntityKind::Variant,
                    &v_path,
                    Rule::DuplicateModelCount {
                        model_count: variant.model_count,
                    },
                ));
            }
            self.points(EntityKind::Variant, &v_path, variant.points);
        }
    }
}

fn escape(segment: &str) -> Cow<'_, str> {
    if segment.contains(['/', '%']) {
        Cow::Owned(segment.replace('%', "%25").replace('/', "%2F"))
    } else {
        Cow::Borrowed(segment)
    }
}

fn join(parent: &str, child: &str) -> String {
    if parent.is_empty() {
        escape(child).into_owned()
    } else {
        format!("{parent}/{}", escape(child))
    }
}

impl RevisionData {
    /// Checks every structural rule and returns all violations found.
    ///
    /// An empty result means the revision can be installed.
    pub fn validate(&self, max_name_len: usize) -> Vec<Violation> {
        let mut checker = Checker {
            max_name_len,
            violations: Vec::new(),
        };

        checker.unique(
            EntityKind::Faction,
            "",
            self.factions.iter().map(|f| f.name.as_str()),
        );
        for faction in &self.factions {
            checker.faction(faction);
        }

        checker.violations
    }
}
