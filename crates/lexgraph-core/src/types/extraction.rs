//! Extraction results exchanged between extractors and the graph store.

use serde::{Deserialize, Serialize};

use super::graph::{PropertyMap, PropertyValue};

/// An entity extracted from a text chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedEntity {
    /// Stable node id.
    pub id: String,
    /// Entity type label.
    #[serde(rename = "type")]
    pub entity_type: String,
    /// Display name.
    pub name: String,
    /// Properties to merge into the node.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl ExtractedEntity {
    /// Create a new extracted entity.
    pub fn new(
        id: impl Into<String>,
        entity_type: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            entity_type: entity_type.into(),
            name: name.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// A relationship extracted from a text chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedRelationship {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// Relationship type.
    #[serde(rename = "type")]
    pub relationship_type: String,
    /// Properties for a newly created edge.
    #[serde(default)]
    pub properties: PropertyMap,
}

impl ExtractedRelationship {
    /// Create a new extracted relationship.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type: relationship_type.into(),
            properties: PropertyMap::new(),
        }
    }

    /// Add a property.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }
}

/// Result of extracting one text chunk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractionResult {
    /// Extracted entities.
    #[serde(default)]
    pub entities: Vec<ExtractedEntity>,
    /// Extracted relationships.
    #[serde(default)]
    pub relationships: Vec<ExtractedRelationship>,
}

impl ExtractionResult {
    /// Check if the result is empty.
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty() && self.relationships.is_empty()
    }

    /// Get entity count.
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    /// Get relationship count.
    pub fn relationship_count(&self) -> usize {
        self.relationships.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extraction_result_wire_shape() {
        let result = ExtractionResult {
            entities: vec![ExtractedEntity::new("req_4_1", "Requirement", "Requirement 4.1")
                .with_property("text", "Approval from DPO is required.")],
            relationships: vec![ExtractedRelationship::new(
                "req_4_1",
                "req_dpo_approval",
                "REQUIRES",
            )],
        };

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["entities"][0]["type"], "Requirement");
        assert_eq!(json["entities"][0]["properties"]["text"], "Approval from DPO is required.");
        assert_eq!(json["relationships"][0]["type"], "REQUIRES");
    }

    #[test]
    fn test_extraction_result_is_empty() {
        let empty = ExtractionResult::default();
        assert!(empty.is_empty());
        assert_eq!(empty.entity_count(), 0);

        let parsed: ExtractionResult = serde_json::from_str(r#"{"entities": []}"#).unwrap();
        assert!(parsed.is_empty());
        assert_eq!(parsed.relationship_count(), 0);
    }
}
