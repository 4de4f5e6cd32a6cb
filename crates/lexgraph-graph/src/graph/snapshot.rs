//! Serializable snapshot form of the knowledge graph.
//!
//! Set-valued fields are stored as lists in lexicographic order so that two
//! snapshots of the same graph are byte-identical.

use serde::{Deserialize, Serialize};

use lexgraph_core::types::{Edge, Node, PropertyMap};

/// A node as written to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    pub entity_type: String,
    pub entity_name: String,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub source_files: Vec<String>,
}

/// An edge as written to a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub source: String,
    pub target: String,
    pub relationship_type: String,
    #[serde(default)]
    pub relationship_types: Vec<String>,
    #[serde(default)]
    pub properties: PropertyMap,
    #[serde(default)]
    pub source_files: Vec<String>,
}

/// The full graph in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub edges: Vec<EdgeRecord>,
}

impl GraphSnapshot {
    /// Check if the snapshot holds no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }
}

impl From<&Node> for NodeRecord {
    fn from(node: &Node) -> Self {
        Self {
            id: node.id.clone(),
            entity_type: node.entity_type.clone(),
            entity_name: node.name.clone(),
            properties: node.properties.clone(),
            // BTreeSet iterates in sorted order
            source_files: node.source_files.iter().cloned().collect(),
        }
    }
}

impl From<NodeRecord> for Node {
    fn from(record: NodeRecord) -> Self {
        Self {
            id: record.id,
            entity_type: record.entity_type,
            name: record.entity_name,
            properties: record.properties,
            source_files: record.source_files.into_iter().collect(),
        }
    }
}

impl From<&Edge> for EdgeRecord {
    fn from(edge: &Edge) -> Self {
        Self {
            source: edge.source.clone(),
            target: edge.target.clone(),
            relationship_type: edge.relationship_type.clone(),
            relationship_types: edge.relationship_types.iter().cloned().collect(),
            properties: edge.properties.clone(),
            source_files: edge.source_files.iter().cloned().collect(),
        }
    }
}

impl From<EdgeRecord> for Edge {
    fn from(record: EdgeRecord) -> Self {
        let mut relationship_types: std::collections::BTreeSet<String> =
            record.relationship_types.into_iter().collect();
        // Older records may predate the accumulated set
        if relationship_types.is_empty() {
            relationship_types.insert(record.relationship_type.clone());
        }
        Self {
            source: record.source,
            target: record.target,
            relationship_type: record.relationship_type,
            relationship_types,
            properties: record.properties,
            source_files: record.source_files.into_iter().collect(),
        }
    }
}
