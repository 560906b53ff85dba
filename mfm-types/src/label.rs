//! Version labels and their natural ordering.
//!
//! Labels are dot-separated, e.g. `"2025.1"` or `"2024.3.hotfix"`. Each
//! component compares numerically when it is all digits and lexically
//! otherwise; numeric components sort before textual ones. A label that
//! is a prefix of another sorts first (`"2025" < "2025.1"`).

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::Error;

/// Selector text for the latest revision; never a valid label.
pub(crate) const LATEST: &str = "latest";

/// The human-facing identifier of one revision of the points manual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VersionLabel(String);

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Component<'a> {
    Number(u64),
    Text(&'a str),
}

impl VersionLabel {
    /// Parses a label, trimming surrounding whitespace.
    ///
    /// Empty labels are rejected, as is `"latest"` in any case, which a
    /// [`VersionSelector`](crate::VersionSelector) would never reach.
    pub fn parse(s: &str) -> crate::Result<Self> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(Error::InvalidLabel(s.to_string()));
        }
        if trimmed.eq_ignore_ascii_case(LATEST) {
            return Err(Error::ReservedLabel(trimmed.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Returns the label text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if every component is numeric.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        self.components()
            .all(|c| matches!(c, Component::Number(_)))
    }

    fn components(&self) -> impl Iterator<Item = Component<'_>> {
        self.0.split('.').map(|part| {
            if !part.is_empty() && part.bytes().all(|b| b.is_ascii_digit()) {
                match part.parse::<u64>() {
                    Ok(n) => Component::Number(n),
                    Err(_) => Component::Text(part),
                }
            } else {
                Component::Text(part)
            }
        })
    }
}

impl PartialOrd for VersionLabel {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VersionLabel {
    fn cmp(&self, other: &Self) -> Ordering {
        // "1.01" and "1.1" share components; fall back to the raw text so
        // the ordering agrees with Eq.
        self.components()
            .cmp(other.components())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl fmt::Display for VersionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for VersionLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for VersionLabel {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VersionLabel> for String {
    fn from(label: VersionLabel) -> Self {
        label.0
    }
}

impl AsRef<str> for VersionLabel {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
