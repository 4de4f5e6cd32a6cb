//! Entity and relationship type vocabularies.
//!
//! Extractors may emit any label; these enums cover the legal/policy
//! vocabulary the prompts ask for and normalize the spellings LLMs produce.
//! Labels outside the vocabulary are kept as supplied.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Entity types of the legal/policy knowledge graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A crime or violation (e.g., "Theft", "Fraud").
    Crime,
    /// A legal element of a crime (e.g., "Intent", "Act").
    Element,
    /// A legal concept (e.g., "Mistake of Fact", "Consent").
    Concept,
    /// A requirement or policy rule (e.g., "DPO Approval").
    Requirement,
    /// A section or subsection of a document.
    Section,
    /// Type could not be determined.
    Unknown,
}

impl EntityKind {
    /// Parse entity type from string with flexible matching.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', '_'], " ");

        match normalized.as_str() {
            "crime" | "crimes" | "violation" | "offence" | "offense" | "infraction"
            | "breach" => Some(Self::Crime),

            "element" | "legal element" | "elements" | "ingredient" => Some(Self::Element),

            "concept" | "legal concept" | "doctrine" | "defence" | "defense"
            | "principle" => Some(Self::Concept),

            "requirement" | "requirements" | "policy" | "rule" | "obligation"
            | "control" => Some(Self::Requirement),

            "section" | "subsection" | "clause" | "article" | "paragraph" => Some(Self::Section),

            "unknown" => Some(Self::Unknown),

            _ => None,
        }
    }

    /// Normalize a raw label: known spellings map to the canonical name,
    /// anything else is kept (trimmed). Blank labels become "Unknown".
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::Unknown.as_str().to_string();
        }
        match Self::from_str_flexible(trimmed) {
            Some(kind) => kind.as_str().to_string(),
            None => trimmed.to_string(),
        }
    }

    /// Get all entity type variants.
    pub fn all() -> &'static [EntityKind] {
        &[
            Self::Crime,
            Self::Element,
            Self::Concept,
            Self::Requirement,
            Self::Section,
            Self::Unknown,
        ]
    }

    /// Convert to string for prompts and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crime => "Crime",
            Self::Element => "Element",
            Self::Concept => "Concept",
            Self::Requirement => "Requirement",
            Self::Section => "Section",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_flexible(s).ok_or_else(|| format!("Unknown entity type: {}", s))
    }
}

/// Relationship types between entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    /// Source needs the target (e.g., theft REQUIRES intent).
    Requires,
    /// Source is missing the target (e.g., accidental act LACKS intent).
    Lacks,
    /// Source is not an instance of the target.
    IsNot,
    /// Source contains the target (e.g., section CONTAINS requirement).
    Contains,
    /// Generic relationship.
    RelatesTo,
}

impl RelationshipKind {
    /// Parse relationship type from string with flexible matching.
    pub fn from_str_flexible(s: &str) -> Option<Self> {
        let normalized = s.trim().to_lowercase().replace(['-', ' '], "_");

        match normalized.as_str() {
            "requires" | "require" | "required" | "needs" | "depends_on" | "mandates" => {
                Some(Self::Requires)
            }

            "lacks" | "lack" | "missing" | "without" | "absent" => Some(Self::Lacks),

            "is_not" | "isnot" | "is_not_a" | "not" | "excludes" => Some(Self::IsNot),

            "contains" | "contain" | "includes" | "has_part" | "comprises" => {
                Some(Self::Contains)
            }

            "relates_to" | "related_to" | "relatesto" | "relates" | "associated_with"
            | "linked_to" => Some(Self::RelatesTo),

            _ => None,
        }
    }

    /// Normalize a raw label: known spellings map to the canonical name,
    /// anything else is upper-snake-cased. Blank labels become RELATES_TO.
    pub fn normalize(raw: &str) -> String {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Self::RelatesTo.as_str().to_string();
        }
        match Self::from_str_flexible(trimmed) {
            Some(kind) => kind.as_str().to_string(),
            None => trimmed
                .split(|c: char| c.is_whitespace() || c == '-')
                .filter(|part| !part.is_empty())
                .collect::<Vec<_>>()
                .join("_")
                .to_uppercase(),
        }
    }

    /// Get all relationship type variants.
    pub fn all() -> &'static [RelationshipKind] {
        &[
            Self::Requires,
            Self::Lacks,
            Self::IsNot,
            Self::Contains,
            Self::RelatesTo,
        ]
    }

    /// Convert to string for prompts and display.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requires => "REQUIRES",
            Self::Lacks => "LACKS",
            Self::IsNot => "IS_NOT",
            Self::Contains => "CONTAINS",
            Self::RelatesTo => "RELATES_TO",
        }
    }
}

impl fmt::Display for RelationshipKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RelationshipKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_flexible(s).ok_or_else(|| format!("Unknown relationship type: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_kind_from_str_flexible() {
        assert_eq!(EntityKind::from_str_flexible("Crime"), Some(EntityKind::Crime));
        assert_eq!(EntityKind::from_str_flexible("VIOLATION"), Some(EntityKind::Crime));
        assert_eq!(EntityKind::from_str_flexible("legal_element"), Some(EntityKind::Element));
        assert_eq!(EntityKind::from_str_flexible("policy"), Some(EntityKind::Requirement));
        assert_eq!(EntityKind::from_str_flexible("  subsection "), Some(EntityKind::Section));
        assert_eq!(EntityKind::from_str_flexible("person"), None);
        assert_eq!(EntityKind::from_str_flexible(""), None);
    }

    #[test]
    fn test_entity_kind_normalize_keeps_unknown_labels() {
        assert_eq!(EntityKind::normalize("requirement"), "Requirement");
        assert_eq!(EntityKind::normalize(" Statute "), "Statute");
        assert_eq!(EntityKind::normalize(""), "Unknown");
    }

    #[test]
    fn test_relationship_kind_from_str_flexible() {
        assert_eq!(RelationshipKind::from_str_flexible("REQUIRES"), Some(RelationshipKind::Requires));
        assert_eq!(RelationshipKind::from_str_flexible("needs"), Some(RelationshipKind::Requires));
        assert_eq!(RelationshipKind::from_str_flexible("is not"), Some(RelationshipKind::IsNot));
        assert_eq!(RelationshipKind::from_str_flexible("is-not"), Some(RelationshipKind::IsNot));
        assert_eq!(RelationshipKind::from_str_flexible("related_to"), Some(RelationshipKind::RelatesTo));
        assert_eq!(RelationshipKind::from_str_flexible("knows"), None);
    }

    #[test]
    fn test_relationship_kind_normalize() {
        assert_eq!(RelationshipKind::normalize("lacks"), "LACKS");
        assert_eq!(RelationshipKind::normalize("defined in"), "DEFINED_IN");
        assert_eq!(RelationshipKind::normalize("   "), "RELATES_TO");
    }

    #[test]
    fn test_relationship_kind_serde() {
        let json = serde_json::to_string(&RelationshipKind::IsNot).unwrap();
        assert_eq!(json, "\"IS_NOT\"");
        let parsed: RelationshipKind = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, RelationshipKind::IsNot);
    }

    #[test]
    fn test_all_variants() {
        assert_eq!(EntityKind::all().len(), 6);
        assert_eq!(RelationshipKind::all().len(), 5);
        assert_eq!(RelationshipKind::Contains.to_string(), "CONTAINS");
    }
}
