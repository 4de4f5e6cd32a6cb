//! Retrieval result types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use lexgraph_core::types::{Edge, Node, PropertyMap};

/// A node matched by free-text search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMatch {
    pub id: String,
    pub entity_type: String,
    pub name: String,
    pub properties: PropertyMap,
    pub source_files: BTreeSet<String>,
}

impl EntityMatch {
    /// The `description` property, if present.
    pub fn description(&self) -> Option<&str> {
        self.properties.get("description").and_then(|v| v.as_text())
    }
}

impl From<&Node> for EntityMatch {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            entity_type: node.entity_type.clone(),
            name: node.name.clone(),
            properties: node.properties.clone(),
            source_files: node.source_files.clone(),
        }
    }
}

/// One neighbor of an entity, seen through the edge that links them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedEntity {
    pub entity_id: String,
    pub entity_name: String,
    pub entity_type: String,
    /// First-seen relationship type of the edge.
    pub relationship: String,
    /// Every relationship type accumulated on the edge.
    pub relationship_types: BTreeSet<String>,
    /// Edge properties.
    pub properties: PropertyMap,
    /// Edge sources.
    pub source_files: BTreeSet<String>,
}

impl LinkedEntity {
    pub(crate) fn new(node: &Node, edge: &Edge) -> Self {
        Self {
            entity_id: node.id.clone(),
            entity_name: node.name.clone(),
            entity_type: node.entity_type.clone(),
            relationship: edge.relationship_type.clone(),
            relationship_types: edge.relationship_types.clone(),
            properties: edge.properties.clone(),
            source_files: edge.source_files.clone(),
        }
    }

    pub fn has_type(&self, relationship_type: &str) -> bool {
        self.relationship == relationship_type || self.relationship_types.contains(relationship_type)
    }
}

/// Direct neighbors of one entity, split by direction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityRelationships {
    pub entity_id: String,
    /// `false` when the id is not in the graph.
    pub found: bool,
    pub outgoing: Vec<LinkedEntity>,
    pub incoming: Vec<LinkedEntity>,
}

/// An entity reached by traversal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraversalHit {
    pub entity_id: String,
    pub entity_name: String,
    pub entity_type: String,
    /// Relationship type of the edge that reached this entity; prefixed with
    /// `reverse_` when the edge was followed against its direction.
    pub relationship: String,
    pub relationship_types: BTreeSet<String>,
    /// Hops from the start entity.
    pub depth: usize,
    /// Properties of the reached entity.
    pub properties: PropertyMap,
}

/// Entities reachable from a start entity within a hop bound.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Traversal {
    pub entity_id: String,
    pub entity_name: Option<String>,
    /// `false` when the start id is not in the graph.
    pub found: bool,
    pub related: Vec<TraversalHit>,
}

/// A matched entity with its neighborhood.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpandedEntity {
    pub entity: EntityMatch,
    pub relationships: EntityRelationships,
    pub traversal: Traversal,
}

/// Everything retrieval found for a question.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    pub question: String,
    pub concepts: Vec<String>,
    pub matched_entities: Vec<EntityMatch>,
    /// Human-readable context blocks for the expanded entities.
    pub graph_context: String,
    pub related_info: Vec<ExpandedEntity>,
}

/// A key relationship surfaced as a reasoning chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphPath {
    pub source: String,
    pub relationship: String,
    pub target: String,
}
