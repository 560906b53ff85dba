use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::label::LATEST;
use crate::VersionLabel;

/// Picks the revision a lookup runs against.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VersionSelector {
    /// The single active revision currently marked latest.
    Latest,
    /// A revision named by its label.
    Exact(VersionLabel),
}

impl VersionSelector {
    /// Selects a revision by label.
    pub fn exact(label: &str) -> crate::Result<Self> {
        Ok(Self::Exact(VersionLabel::parse(label)?))
    }

    /// Returns true for the "latest" sentinel.
    #[must_use]
    pub fn is_latest(&self) -> bool {
        matches!(self, Self::Latest)
    }
}

impl Default for VersionSelector {
    fn default() -> Self {
        Self::Latest
    }
}

impl From<VersionLabel> for VersionSelector {
    fn from(label: VersionLabel) -> Self {
        Self::Exact(label)
    }
}

impl fmt::Display for VersionSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Latest => f.write_str(LATEST),
            Self::Exact(label) => write!(f, "{label}"),
        }
    }
}

/// `""` and `"latest"` (any case) select the latest revision; anything else
/// is taken as a label.
impl FromStr for VersionSelector {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(LATEST) {
            return Ok(Self::Latest);
        }
        Self::exact(trimmed)
    }
}
