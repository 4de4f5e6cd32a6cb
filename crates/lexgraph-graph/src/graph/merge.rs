//! Additive merge of extraction batches into the graph.

use serde::{Deserialize, Serialize};

use lexgraph_core::types::{
    is_reserved_key, Edge, EntityKind, ExtractedEntity, ExtractedRelationship, Node, PropertyMap,
    RelationshipKind,
};

use super::KnowledgeGraph;

/// What a merge changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeStats {
    pub nodes_created: usize,
    pub nodes_updated: usize,
    pub edges_created: usize,
    pub edges_updated: usize,
}

impl MergeStats {
    /// Accumulate another merge's counts.
    pub fn absorb(&mut self, other: MergeStats) {
        self.nodes_created += other.nodes_created;
        self.nodes_updated += other.nodes_updated;
        self.edges_created += other.edges_created;
        self.edges_updated += other.edges_updated;
    }
}

impl KnowledgeGraph {
    /// Fold one extraction batch from `source_file` into the graph.
    ///
    /// Existing data is never lost: populated properties keep their first
    /// value, while `source_files` and an edge's `relationship_types` only
    /// grow. Entities with an empty id and relationships with an empty
    /// endpoint are skipped.
    pub fn merge(
        &mut self,
        entities: &[ExtractedEntity],
        relationships: &[ExtractedRelationship],
        source_file: &str,
    ) -> MergeStats {
        let mut stats = MergeStats::default();

        for entity in entities {
            if entity.id.trim().is_empty() {
                continue;
            }
            if self.merge_entity(entity, source_file) {
                stats.nodes_created += 1;
            } else {
                stats.nodes_updated += 1;
            }
        }

        for relationship in relationships {
            if relationship.source.trim().is_empty() || relationship.target.trim().is_empty() {
                continue;
            }
            let (from, source_created) = self.ensure_placeholder(&relationship.source, source_file);
            let (to, target_created) = self.ensure_placeholder(&relationship.target, source_file);
            stats.nodes_created += usize::from(source_created) + usize::from(target_created);

            let relationship_type = if relationship.relationship_type.trim().is_empty() {
                RelationshipKind::RelatesTo.as_str().to_string()
            } else {
                relationship.relationship_type.trim().to_string()
            };

            match self.graph.find_edge(from, to) {
                Some(idx) => {
                    let edge = &mut self.graph[idx];
                    edge.relationship_types.insert(relationship_type);
                    edge.source_files.insert(source_file.to_string());
                    stats.edges_updated += 1;
                }
                None => {
                    let mut edge = Edge::new(
                        relationship.source.clone(),
                        relationship.target.clone(),
                        relationship_type,
                    );
                    edge.properties = unreserved(&relationship.properties);
                    edge.source_files.insert(source_file.to_string());
                    self.graph.add_edge(from, to, edge);
                    stats.edges_created += 1;
                }
            }
        }

        stats
    }

    /// Returns `true` when a new node was created.
    fn merge_entity(&mut self, entity: &ExtractedEntity, source_file: &str) -> bool {
        let entity_type = entity.entity_type.trim();
        let name = entity.name.trim();

        let Some(&idx) = self.index.get(&entity.id) else {
            let mut node = Node::new(
                entity.id.clone(),
                if entity_type.is_empty() {
                    EntityKind::Unknown.as_str()
                } else {
                    entity_type
                },
                if name.is_empty() { entity.id.as_str() } else { name },
            );
            node.properties = unreserved(&entity.properties);
            node.source_files.insert(source_file.to_string());
            self.insert_node(node);
            return true;
        };

        let node = &mut self.graph[idx];
        node.source_files.insert(source_file.to_string());

        // Placeholder endpoints adopt the first real type and name
        if is_untyped(&node.entity_type) {
            let unnamed = node.name.is_empty() || node.name == node.id;
            if !is_untyped(entity_type) {
                node.entity_type = entity_type.to_string();
            }
            if unnamed && !name.is_empty() {
                node.name = name.to_string();
            }
        }

        for (key, value) in &entity.properties {
            if is_reserved_key(key) {
                continue;
            }
            let populated = node.properties.get(key).is_some_and(|v| !v.is_empty());
            if !populated {
                node.properties.insert(key.clone(), value.clone());
            }
        }

        false
    }
}

fn is_untyped(entity_type: &str) -> bool {
    entity_type.is_empty() || entity_type == EntityKind::Unknown.as_str()
}

fn unreserved(properties: &PropertyMap) -> PropertyMap {
    properties
        .iter()
        .filter(|(key, _)| !is_reserved_key(key))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}
