//! Domain entities: core data structures

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Numeric taxonomy identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaxId(pub u64);

impl TaxId {
    /// Conventional identifier of the taxonomy root.
    pub const ROOT: TaxId = TaxId(1);
}

impl fmt::Display for TaxId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TaxId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(TaxId)
    }
}

impl From<u64> for TaxId {
    fn from(value: u64) -> Self {
        TaxId(value)
    }
}

/// Identifier → display label for the ancestors of one lineage.
pub type LabelMap = BTreeMap<TaxId, String>;

/// Outcome of resolving one entity name against a lineage source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    /// Ancestor identifiers, root first, the entity itself last
    pub lineage: Vec<TaxId>,
    /// Labels for (at least) every identifier in `lineage`
    pub labels: LabelMap,
}

impl Resolution {
    /// Identifier of the resolved entity (last element of the lineage).
    pub fn taxid(&self) -> Option<TaxId> {
        self.lineage.last().copied()
    }
}

/// An entity requested by the user, optionally carrying a score for export.
#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub name: String,
    pub score: Option<f64>,
}

impl Entity {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            score: None,
        }
    }

    pub fn with_score(mut self, score: f64) -> Self {
        self.score = Some(score);
        self
    }

    /// Parse one line of an entity list.
    ///
    /// Format: `name` or `name<TAB>score`. Blank lines and `#` comments yield `None`.
    /// An unparsable score is treated as absent.
    pub fn parse_line(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }

        match trimmed.rsplit_once('\t') {
            Some((name, score)) => {
                let name = name.trim();
                if name.is_empty() {
                    return None;
                }
                Some(Self {
                    name: name.to_string(),
                    score: score.trim().parse().ok(),
                })
            }
            None => Some(Self::new(trimmed)),
        }
    }
}

/// An entity that made it into the tree.
#[derive(Debug, Clone, PartialEq)]
pub struct InsertedEntity {
    pub name: String,
    pub taxid: TaxId,
    pub score: Option<f64>,
}

/// Why an entity was left out of the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// The lineage source does not know the name
    Unresolved,
    /// An ancestor identifier had no label
    MissingLabel(TaxId),
    /// Lineage empty, not rooted at the sentinel, or conflicting with the tree
    MalformedPath(String),
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::Unresolved => write!(f, "unresolved entity"),
            SkipReason::MissingLabel(id) => write!(f, "missing label for taxid {}", id),
            SkipReason::MalformedPath(reason) => write!(f, "malformed lineage: {}", reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntity {
    pub name: String,
    pub reason: SkipReason,
}

/// Same identifier seen with two different labels; the first one is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConflict {
    pub taxid: TaxId,
    pub kept: String,
    pub rejected: String,
}

impl fmt::Display for LabelConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "taxid {} labeled '{}' and '{}', keeping '{}'",
            self.taxid, self.kept, self.rejected, self.kept
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_line_with_score_when_parsing_then_splits_name_and_score() {
        let entity = Entity::parse_line("Tribolium madens\t0.75").unwrap();
        assert_eq!(entity.name, "Tribolium madens");
        assert_eq!(entity.score, Some(0.75));
    }

    #[test]
    fn given_comment_or_blank_when_parsing_then_none() {
        assert!(Entity::parse_line("# beetles").is_none());
        assert!(Entity::parse_line("   ").is_none());
    }

    #[test]
    fn given_bad_score_when_parsing_then_score_absent() {
        let entity = Entity::parse_line("Zophobas morio\tlots").unwrap();
        assert_eq!(entity.name, "Zophobas morio");
        assert_eq!(entity.score, None);
    }
}
