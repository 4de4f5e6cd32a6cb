//! Retrieval engine: entity matching, neighborhood expansion, traversal and
//! path finding over a [`KnowledgeGraph`].
//!
//! Every operation borrows the graph immutably, so callers run them under a
//! single read guard and see one consistent state.

use std::collections::{HashSet, VecDeque};
use std::sync::Arc;

use lexgraph_core::config::RetrievalConfig;
use lexgraph_core::traits::ConceptExtractor;
use lexgraph_core::types::{Edge, Node};

use crate::graph::KnowledgeGraph;

use super::concepts::KeywordConceptExtractor;
use super::context::build_context;
use super::types::{
    EntityMatch, EntityRelationships, ExpandedEntity, LinkedEntity, QueryResult, Traversal,
    TraversalHit,
};

/// Default hop bound for [`RetrievalEngine::find_paths`].
pub const DEFAULT_MAX_PATH_LENGTH: usize = 5;

/// Graph retrieval with a pluggable concept extractor.
#[derive(Clone)]
pub struct RetrievalEngine {
    concepts: Arc<dyn ConceptExtractor>,
    config: RetrievalConfig,
}

impl RetrievalEngine {
    /// Create an engine using keyword concept extraction.
    pub fn new(config: RetrievalConfig) -> Self {
        Self {
            concepts: Arc::new(KeywordConceptExtractor::new()),
            config,
        }
    }

    /// Replace the concept extractor.
    pub fn with_concept_extractor(mut self, concepts: Arc<dyn ConceptExtractor>) -> Self {
        self.concepts = concepts;
        self
    }

    pub fn config(&self) -> &RetrievalConfig {
        &self.config
    }

    /// Extract seed concepts from a question.
    pub fn extract_concepts(&self, question: &str) -> Vec<String> {
        self.concepts
            .extract_concepts(question, self.config.max_concepts)
    }

    /// Case-insensitive search over names, ids, types and text properties.
    ///
    /// Exact matches on name, id or a text property come first, then
    /// substring matches; each group keeps graph insertion order.
    pub fn find_related_entities(
        &self,
        graph: &KnowledgeGraph,
        query: &str,
        max_results: usize,
    ) -> Vec<EntityMatch> {
        let query = query.trim().to_lowercase();
        if query.is_empty() || max_results == 0 {
            return Vec::new();
        }

        let mut exact = Vec::new();
        let mut partial = Vec::new();

        for node in graph.nodes() {
            let name = node.name.to_lowercase();
            let id = node.id.to_lowercase();
            let texts: Vec<String> = node
                .properties
                .values()
                .filter_map(|v| v.as_text())
                .map(str::to_lowercase)
                .collect();

            if name == query || id == query || texts.iter().any(|t| *t == query) {
                exact.push(node);
            } else if name.contains(&query)
                || id.contains(&query)
                || node.entity_type.to_lowercase().contains(&query)
                || texts.iter().any(|t| t.contains(&query))
            {
                partial.push(node);
            }
        }

        exact
            .into_iter()
            .chain(partial)
            .take(max_results)
            .map(EntityMatch::from)
            .collect()
    }

    /// Direct neighbors of `entity_id`, optionally restricted to edges
    /// carrying one of `relationship_types`.
    pub fn get_entity_relationships(
        &self,
        graph: &KnowledgeGraph,
        entity_id: &str,
        relationship_types: Option<&[String]>,
    ) -> EntityRelationships {
        if !graph.contains(entity_id) {
            return EntityRelationships {
                entity_id: entity_id.to_string(),
                ..Default::default()
            };
        }

        let linked = |pairs: Vec<(&Node, &Edge)>| -> Vec<LinkedEntity> {
            pairs
                .into_iter()
                .filter(|(_, edge)| passes_filter(edge, relationship_types))
                .map(|(node, edge)| LinkedEntity::new(node, edge))
                .collect()
        };

        EntityRelationships {
            entity_id: entity_id.to_string(),
            found: true,
            outgoing: linked(graph.outgoing(entity_id)),
            incoming: linked(graph.incoming(entity_id)),
        }
    }

    /// Breadth-first walk over edges in both directions, up to `max_depth`
    /// hops. Each entity is reported once, at the depth it was first
    /// reached; the start entity is never reported.
    pub fn traverse(
        &self,
        graph: &KnowledgeGraph,
        start_entity: &str,
        relationship_types: Option<&[String]>,
        max_depth: usize,
    ) -> Traversal {
        let Some(start) = graph.node(start_entity) else {
            return Traversal {
                entity_id: start_entity.to_string(),
                ..Default::default()
            };
        };

        let mut related = Vec::new();
        let mut visited: HashSet<String> = HashSet::from([start.id.clone()]);
        let mut queue: VecDeque<(String, usize)> = VecDeque::from([(start.id.clone(), 0)]);

        while let Some((current, depth)) = queue.pop_front() {
            if depth >= max_depth {
                continue;
            }

            let outgoing = graph
                .outgoing(&current)
                .into_iter()
                .map(|(node, edge)| (node, edge, edge.relationship_type.clone()));
            let incoming = graph
                .incoming(&current)
                .into_iter()
                .map(|(node, edge)| (node, edge, format!("reverse_{}", edge.relationship_type)));

            for (node, edge, relationship) in outgoing.chain(incoming) {
                if visited.contains(&node.id) || !passes_filter(edge, relationship_types) {
                    continue;
                }
                visited.insert(node.id.clone());
                queue.push_back((node.id.clone(), depth + 1));
                related.push(TraversalHit {
                    entity_id: node.id.clone(),
                    entity_name: node.name.clone(),
                    entity_type: node.entity_type.clone(),
                    relationship,
                    relationship_types: edge.relationship_types.clone(),
                    depth: depth + 1,
                    properties: node.properties.clone(),
                });
            }
        }

        Traversal {
            entity_id: start.id.clone(),
            entity_name: Some(start.name.clone()),
            found: true,
            related,
        }
    }

    /// Simple directed paths of at most `max_length` edges, capped at
    /// `max_paths` from the config.
    pub fn find_paths(
        &self,
        graph: &KnowledgeGraph,
        source_entity: &str,
        target_entity: &str,
        max_length: Option<usize>,
    ) -> Vec<Vec<String>> {
        graph.simple_paths(
            source_entity,
            target_entity,
            max_length.unwrap_or(DEFAULT_MAX_PATH_LENGTH),
            self.config.max_paths,
        )
    }

    /// Answer-oriented retrieval: concepts, matched entities and the
    /// neighborhood of the strongest matches.
    pub fn query_graph(&self, graph: &KnowledgeGraph, question: &str) -> QueryResult {
        let concepts = self.extract_concepts(question);

        let mut seen = HashSet::new();
        let mut matched = Vec::new();
        for concept in &concepts {
            for entity in
                self.find_related_entities(graph, concept, self.config.matches_per_concept)
            {
                if seen.insert(entity.id.clone()) {
                    matched.push(entity);
                }
            }
        }

        let related_info: Vec<ExpandedEntity> = matched
            .iter()
            .take(self.config.max_expanded_entities)
            .map(|entity| ExpandedEntity {
                relationships: self.get_entity_relationships(graph, &entity.id, None),
                traversal: self.traverse(graph, &entity.id, None, self.config.traversal_depth),
                entity: entity.clone(),
            })
            .collect();

        let graph_context = build_context(&related_info);
        matched.truncate(self.config.max_matched_entities);

        tracing::debug!(
            "Query matched {} entities from {} concepts",
            matched.len(),
            concepts.len()
        );

        QueryResult {
            question: question.to_string(),
            concepts,
            matched_entities: matched,
            graph_context,
            related_info,
        }
    }
}

fn passes_filter(edge: &Edge, relationship_types: Option<&[String]>) -> bool {
    match relationship_types {
        None => true,
        Some(types) => types.iter().any(|t| edge.has_type(t)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgraph_core::types::{ExtractedEntity, ExtractedRelationship};

    fn engine() -> RetrievalEngine {
        RetrievalEngine::new(RetrievalConfig::default())
    }

    fn entity(id: &str, kind: &str, name: &str) -> ExtractedEntity {
        ExtractedEntity::new(id, kind, name)
    }

    fn rel(source: &str, target: &str, kind: &str) -> ExtractedRelationship {
        ExtractedRelationship::new(source, target, kind)
    }

    /// theft REQUIRES intent, theft REQUIRES property, accident IS_NOT theft,
    /// intent RELATES_TO mens_rea
    fn legal_graph() -> KnowledgeGraph {
        let mut graph = KnowledgeGraph::new();
        graph.merge(
            &[
                entity("theft", "Crime", "Theft")
                    .with_property("description", "Dishonest appropriation of property"),
                entity("intent", "Element", "Intent"),
                entity("property", "Element", "Property"),
                entity("accident", "Concept", "Accident"),
                entity("mens_rea", "Concept", "Mens Rea"),
            ],
            &[
                rel("theft", "intent", "REQUIRES"),
                rel("theft", "property", "REQUIRES"),
                rel("accident", "theft", "IS_NOT"),
                rel("intent", "mens_rea", "RELATES_TO"),
            ],
            "penal_code.txt",
        );
        graph
    }

    #[test]
    fn test_exact_matches_first() {
        let graph = legal_graph();
        let matches = engine().find_related_entities(&graph, "Property", 10);
        let ids: Vec<&str> = matches.iter().map(|m| m.id.as_str()).collect();
        // "property" matches exactly; theft only through its description
        assert_eq!(ids, vec!["property", "theft"]);
    }

    #[test]
    fn test_blank_query_and_type_match() {
        let graph = legal_graph();
        assert!(engine().find_related_entities(&graph, "  ", 10).is_empty());

        let concepts = engine().find_related_entities(&graph, "concept", 10);
        let ids: Vec<&str> = concepts.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["accident", "mens_rea"]);
    }

    #[test]
    fn test_relationships_filtered_by_type() {
        let graph = legal_graph();
        let rels = engine().get_entity_relationships(&graph, "theft", None);
        assert!(rels.found);
        assert_eq!(rels.outgoing.len(), 2);
        assert_eq!(rels.incoming.len(), 1);
        assert_eq!(rels.incoming[0].entity_id, "accident");
        assert_eq!(rels.incoming[0].relationship, "IS_NOT");

        let filter = ["IS_NOT".to_string()];
        let rels = engine().get_entity_relationships(&graph, "theft", Some(&filter));
        assert!(rels.outgoing.is_empty());
        assert_eq!(rels.incoming.len(), 1);

        let missing = engine().get_entity_relationships(&graph, "robbery", None);
        assert!(!missing.found);
        assert!(missing.outgoing.is_empty() && missing.incoming.is_empty());
    }

    #[test]
    fn test_traverse_both_directions_with_depth() {
        let graph = legal_graph();
        let traversal = engine().traverse(&graph, "theft", None, 2);
        assert!(traversal.found);

        let hits: Vec<(&str, &str, usize)> = traversal
            .related
            .iter()
            .map(|h| (h.entity_id.as_str(), h.relationship.as_str(), h.depth))
            .collect();
        assert_eq!(
            hits,
            vec![
                ("intent", "REQUIRES", 1),
                ("property", "REQUIRES", 1),
                ("accident", "reverse_IS_NOT", 1),
                ("mens_rea", "RELATES_TO", 2),
            ]
        );

        let shallow = engine().traverse(&graph, "theft", None, 1);
        assert_eq!(shallow.related.len(), 3);
        assert!(engine().traverse(&graph, "theft", None, 0).related.is_empty());
    }

    #[test]
    fn test_traverse_filter_and_missing_start() {
        let graph = legal_graph();
        let filter = ["REQUIRES".to_string()];
        let traversal = engine().traverse(&graph, "theft", Some(&filter), 3);
        let ids: Vec<&str> = traversal.related.iter().map(|h| h.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["intent", "property"]);

        let missing = engine().traverse(&graph, "robbery", None, 2);
        assert!(!missing.found);
        assert!(missing.entity_name.is_none());
        assert!(missing.related.is_empty());
    }

    #[test]
    fn test_find_paths() {
        let graph = legal_graph();
        let paths = engine().find_paths(&graph, "accident", "mens_rea", None);
        assert_eq!(paths, vec![vec!["accident", "theft", "intent", "mens_rea"]]);

        assert!(engine()
            .find_paths(&graph, "accident", "mens_rea", Some(2))
            .is_empty());
        assert!(engine().find_paths(&graph, "mens_rea", "accident", None).is_empty());
    }

    #[test]
    fn test_query_graph() {
        let graph = legal_graph();
        let result = engine().query_graph(&graph, "Is accidental theft of a phone a crime?");

        assert!(result.concepts.contains(&"theft".to_string()));
        assert_eq!(result.matched_entities[0].id, "theft");
        assert!(result.related_info.len() <= 5);
        assert_eq!(result.related_info[0].entity.id, "theft");
        assert_eq!(result.related_info[0].traversal.related.len(), 4);
        assert!(result.graph_context.contains("=== Crime: Theft ==="));
    }

    #[test]
    fn test_query_empty_graph() {
        let graph = KnowledgeGraph::new();
        let result = engine().query_graph(&graph, "Does external storage need DPO approval?");
        assert!(!result.concepts.is_empty());
        assert!(result.matched_entities.is_empty());
        assert!(result.related_info.is_empty());
        assert!(result.graph_context.contains("No entities found"));
    }
}
