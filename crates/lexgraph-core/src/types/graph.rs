//! Node, edge and property types of the knowledge graph.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Property key holding the set of sources that contributed to a node or edge.
pub const SOURCE_FILES_KEY: &str = "source_files";
/// Property key holding the accumulated relationship types of an edge.
pub const RELATIONSHIP_TYPES_KEY: &str = "relationship_types";
/// Property key of the first-seen relationship type of an edge.
pub const RELATIONSHIP_TYPE_KEY: &str = "relationship_type";
/// Property key of a node's entity type in flattened views.
pub const ENTITY_TYPE_KEY: &str = "entity_type";
/// Property key of a node's display name in flattened views.
pub const ENTITY_NAME_KEY: &str = "entity_name";

/// Keys that are stored as dedicated fields and never live in a property map.
pub const RESERVED_KEYS: &[&str] = &[
    SOURCE_FILES_KEY,
    RELATIONSHIP_TYPES_KEY,
    RELATIONSHIP_TYPE_KEY,
    ENTITY_TYPE_KEY,
    ENTITY_NAME_KEY,
];

/// Check whether a property key is reserved.
pub fn is_reserved_key(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

/// A property value: a single string or a set of strings.
///
/// Serialized untagged, so a set is written as a JSON array (in sorted order)
/// and any JSON array of strings reads back as a set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PropertyValue {
    Text(String),
    Set(BTreeSet<String>),
}

impl PropertyValue {
    /// Whether the value counts as unpopulated for merge purposes.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Text(s) => s.is_empty(),
            Self::Set(s) => s.is_empty(),
        }
    }

    /// The string value, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s.as_str()),
            Self::Set(_) => None,
        }
    }

    /// The set value, if this is a set value.
    pub fn as_set(&self) -> Option<&BTreeSet<String>> {
        match self {
            Self::Text(_) => None,
            Self::Set(s) => Some(s),
        }
    }

    /// Render as a display string (sets joined with ", ").
    pub fn to_display_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Set(s) => s.iter().cloned().collect::<Vec<_>>().join(", "),
        }
    }

    /// Convert to a JSON value.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Text(s) => serde_json::Value::String(s.clone()),
            Self::Set(s) => serde_json::Value::Array(
                s.iter().cloned().map(serde_json::Value::String).collect(),
            ),
        }
    }

    /// Convert an arbitrary JSON value into a property value.
    ///
    /// Strings, numbers and booleans become text; arrays become sets of their
    /// elements' string forms; objects are kept as their JSON text. `null`
    /// has no property form and yields `None`.
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(Self::Text(s.clone())),
            serde_json::Value::Bool(b) => Some(Self::Text(b.to_string())),
            serde_json::Value::Number(n) => Some(Self::Text(n.to_string())),
            serde_json::Value::Array(items) => Some(Self::Set(
                items
                    .iter()
                    .filter(|v| !v.is_null())
                    .map(|v| match v {
                        serde_json::Value::String(s) => s.clone(),
                        other => other.to_string(),
                    })
                    .collect(),
            )),
            serde_json::Value::Object(_) => Some(Self::Text(value.to_string())),
        }
    }
}

impl From<&str> for PropertyValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for PropertyValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

/// Open, string-keyed property map.
pub type PropertyMap = BTreeMap<String, PropertyValue>;

/// A node (entity) of the knowledge graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Stable, globally unique key.
    pub id: String,
    /// Entity type label (e.g. "Requirement", "Section").
    pub entity_type: String,
    /// Display name.
    pub name: String,
    /// Open property map.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Every source that contributed to this node.
    #[serde(default)]
    pub source_files: BTreeSet<String>,
}

impl Node {
    /// Create a new node with no properties or sources.
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
            source_files: BTreeSet::new(),
        }
    }

    /// Get a text property.
    pub fn text_property(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(PropertyValue::as_text)
    }

    /// The `description` property, if present.
    pub fn description(&self) -> Option<&str> {
        self.text_property("description")
    }
}

/// A directed edge (relationship) of the knowledge graph.
///
/// There is at most one edge per ordered `(source, target)` pair; every type
/// merged for the pair accumulates in `relationship_types`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node id.
    pub source: String,
    /// Target node id.
    pub target: String,
    /// First-seen relationship type.
    pub relationship_type: String,
    /// Every relationship type merged for this pair.
    pub relationship_types: BTreeSet<String>,
    /// Open property map.
    #[serde(default)]
    pub properties: PropertyMap,
    /// Every source that contributed to this edge.
    #[serde(default)]
    pub source_files: BTreeSet<String>,
}

impl Edge {
    /// Create a new edge carrying a single relationship type.
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        relationship_type: impl Into<String>,
    ) -> Self {
        let relationship_type = relationship_type.into();
        let mut relationship_types = BTreeSet::new();
        relationship_types.insert(relationship_type.clone());
        Self {
            source: source.into(),
            target: target.into(),
            relationship_type,
            relationship_types,
            properties: PropertyMap::new(),
            source_files: BTreeSet::new(),
        }
    }

    /// Whether the edge has ever been merged with the given type.
    pub fn has_type(&self, relationship_type: &str) -> bool {
        self.relationship_types.contains(relationship_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_value_untagged_serde() {
        let text = PropertyValue::from("Approval from DPO is required.");
        assert_eq!(
            serde_json::to_string(&text).unwrap(),
            "\"Approval from DPO is required.\""
        );

        let set: PropertyValue = serde_json::from_str(r#"["b.txt", "a.txt", "b.txt"]"#).unwrap();
        let expected: BTreeSet<String> = ["a.txt", "b.txt"].iter().map(|s| s.to_string()).collect();
        assert_eq!(set, PropertyValue::Set(expected));
        assert_eq!(serde_json::to_string(&set).unwrap(), r#"["a.txt","b.txt"]"#);
    }

    #[test]
    fn test_property_value_from_json() {
        use serde_json::json;

        assert_eq!(
            PropertyValue::from_json(&json!(4.1)),
            Some(PropertyValue::Text("4.1".to_string()))
        );
        assert_eq!(
            PropertyValue::from_json(&json!(true)),
            Some(PropertyValue::Text("true".to_string()))
        );
        assert_eq!(PropertyValue::from_json(&json!(null)), None);

        let set = PropertyValue::from_json(&json!(["intent", "act", 3])).unwrap();
        assert_eq!(set.as_set().map(|s| s.len()), Some(3));
        assert!(set.as_set().unwrap().contains("3"));
    }

    #[test]
    fn test_property_value_emptiness() {
        assert!(PropertyValue::from("").is_empty());
        assert!(PropertyValue::Set(BTreeSet::new()).is_empty());
        assert!(!PropertyValue::from("x").is_empty());
    }

    #[test]
    fn test_edge_new_records_type() {
        let edge = Edge::new("req_4_1", "req_dpo_approval", "REQUIRES");
        assert_eq!(edge.relationship_type, "REQUIRES");
        assert!(edge.has_type("REQUIRES"));
        assert!(!edge.has_type("CONTAINS"));
    }

    #[test]
    fn test_reserved_keys() {
        assert!(is_reserved_key("source_files"));
        assert!(is_reserved_key("entity_type"));
        assert!(!is_reserved_key("description"));
    }
}
