//! Text rendering of retrieval results for the decision-maker.

use std::fmt::Write;

use lexgraph_core::types::RelationshipKind;

use super::types::{ExpandedEntity, GraphPath, LinkedEntity, QueryResult};

const CONTEXT_ITEMS: usize = 5;
const EVIDENCE_ENTITIES: usize = 5;
const CHAIN_ENTITIES: usize = 3;
const CHAINS_PER_ENTITY: usize = 3;
const MAX_GRAPH_PATHS: usize = 10;

/// Relationship types that carry legal meaning, in priority order.
pub const KEY_RELATIONSHIPS: &[RelationshipKind] = &[
    RelationshipKind::Requires,
    RelationshipKind::Lacks,
    RelationshipKind::IsNot,
];

/// The key relationship type of an edge: its first-seen type if that is a
/// key type, otherwise the first key type it has accumulated.
pub fn key_relationship(link: &LinkedEntity) -> Option<&'static str> {
    KEY_RELATIONSHIPS
        .iter()
        .map(RelationshipKind::as_str)
        .find(|kind| link.relationship == *kind)
        .or_else(|| {
            KEY_RELATIONSHIPS
                .iter()
                .map(RelationshipKind::as_str)
                .find(|kind| link.relationship_types.contains(*kind))
        })
}

/// One context block per expanded entity.
pub fn build_context(related_info: &[ExpandedEntity]) -> String {
    if related_info.is_empty() {
        return "=== No entities found ===\nNo entities in the knowledge graph matched this question.\n"
            .to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    for info in related_info {
        let entity = &info.entity;
        parts.push(format!("\n=== {}: {} ===", entity.entity_type, entity.name));
        if let Some(description) = entity.description() {
            parts.push(format!("Description: {}", description));
        }

        let rels = &info.relationships;
        if !rels.outgoing.is_empty() {
            parts.push("Relationships (requires/contains):".to_string());
            for link in rels.outgoing.iter().take(CONTEXT_ITEMS) {
                parts.push(format!(
                    "  - {} {} {}",
                    entity.name, link.relationship, link.entity_name
                ));
            }
        }
        if !rels.incoming.is_empty() {
            parts.push("Related from:".to_string());
            for link in rels.incoming.iter().take(CONTEXT_ITEMS) {
                parts.push(format!(
                    "  - {} {} {}",
                    link.entity_name, link.relationship, entity.name
                ));
            }
        }

        if !info.traversal.related.is_empty() {
            parts.push("Related entities (traversal):".to_string());
            for hit in info.traversal.related.iter().take(CONTEXT_ITEMS) {
                parts.push(format!(
                    "  - {} → {} ({}, depth {})",
                    entity.name, hit.entity_name, hit.relationship, hit.depth
                ));
            }
        }
    }

    parts.join("\n")
}

/// Render a query result as the evidence document handed to the
/// decision-maker.
pub fn format_evidence(result: &QueryResult) -> String {
    let mut out = String::from("KNOWLEDGE GRAPH CONTEXT:\n\n");
    if result.graph_context.trim().is_empty() {
        out.push_str("No relevant entities found in graph.");
    } else {
        out.push_str(&result.graph_context);
    }
    out.push('\n');

    if !result.matched_entities.is_empty() {
        out.push_str("\nRELEVANT ENTITIES FROM GRAPH:\n");
        for entity in result.matched_entities.iter().take(EVIDENCE_ENTITIES) {
            let _ = writeln!(out, "- {}: {}", entity.entity_type, entity.name);
            if let Some(description) = entity.description() {
                let _ = writeln!(out, "  Description: {}", description);
            }
            if let Some(text) = entity.properties.get("text").and_then(|v| v.as_text()) {
                let _ = writeln!(out, "  Text: {}", text);
            }
        }
    }

    let mut chains = String::new();
    for info in result.related_info.iter().take(CHAIN_ENTITIES) {
        let mut lines = info
            .relationships
            .outgoing
            .iter()
            .filter_map(|link| key_relationship(link).map(|kind| (kind, link)))
            .take(CHAINS_PER_ENTITY)
            .peekable();
        if lines.peek().is_none() {
            continue;
        }
        for (kind, link) in lines {
            let _ = writeln!(chains, "- {} {} {}", info.entity.name, kind, link.entity_name);
        }
        chains.push('\n');
    }
    if !chains.is_empty() {
        out.push_str("\nRELATIONSHIP CHAINS:\n");
        out.push_str(&chains);
    }

    out
}

/// Key relationships around the strongest matches, as source/target name
/// triples.
pub fn extract_graph_paths(result: &QueryResult) -> Vec<GraphPath> {
    let mut paths = Vec::new();

    for info in result.related_info.iter().take(CHAIN_ENTITIES) {
        let name = &info.entity.name;
        for link in &info.relationships.outgoing {
            if let Some(kind) = key_relationship(link) {
                paths.push(GraphPath {
                    source: name.clone(),
                    relationship: kind.to_string(),
                    target: link.entity_name.clone(),
                });
            }
        }
        for link in &info.relationships.incoming {
            if let Some(kind) = key_relationship(link) {
                paths.push(GraphPath {
                    source: link.entity_name.clone(),
                    relationship: kind.to_string(),
                    target: name.clone(),
                });
            }
        }
    }

    paths.truncate(MAX_GRAPH_PATHS);
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::KnowledgeGraph;
    use crate::retrieval::RetrievalEngine;
    use lexgraph_core::config::RetrievalConfig;
    use lexgraph_core::types::{ExtractedEntity, ExtractedRelationship};

    fn dpo_result() -> QueryResult {
        let mut graph = KnowledgeGraph::new();
        graph.merge(
            &[
                ExtractedEntity::new("req_4_1", "Requirement", "Requirement 4.1")
                    .with_property("text", "Approval from DPO is required."),
                ExtractedEntity::new("req_dpo_approval", "Requirement", "DPO Approval Required"),
                ExtractedEntity::new("section_4", "Section", "Section 4"),
            ],
            &[
                ExtractedRelationship::new("section_4", "req_4_1", "CONTAINS"),
                ExtractedRelationship::new("req_4_1", "req_dpo_approval", "REQUIRES"),
            ],
            "policy.txt",
        );
        RetrievalEngine::new(RetrievalConfig::default())
            .query_graph(&graph, "Does storing data externally require DPO approval?")
    }

    #[test]
    fn test_evidence_sections_in_order() {
        let evidence = format_evidence(&dpo_result());

        let context = evidence.find("KNOWLEDGE GRAPH CONTEXT:").unwrap();
        let entities = evidence.find("RELEVANT ENTITIES FROM GRAPH:").unwrap();
        let chains = evidence.find("RELATIONSHIP CHAINS:").unwrap();
        assert!(context < entities && entities < chains);

        assert!(evidence.contains("- Requirement: Requirement 4.1"));
        assert!(evidence.contains("  Text: Approval from DPO is required."));
        assert!(evidence.contains("- Requirement 4.1 REQUIRES DPO Approval Required"));
    }

    #[test]
    fn test_evidence_for_empty_result() {
        let evidence = format_evidence(&QueryResult::default());
        assert!(evidence.starts_with("KNOWLEDGE GRAPH CONTEXT:\n\nNo relevant entities found in graph."));
        assert!(!evidence.contains("RELEVANT ENTITIES"));
        assert!(!evidence.contains("RELATIONSHIP CHAINS"));
    }

    #[test]
    fn test_graph_paths_skip_non_key_relationships() {
        let paths = extract_graph_paths(&dpo_result());
        assert!(!paths.is_empty());
        assert!(paths.iter().all(|p| p.relationship == "REQUIRES"));
        assert!(paths.contains(&GraphPath {
            source: "Requirement 4.1".to_string(),
            relationship: "REQUIRES".to_string(),
            target: "DPO Approval Required".to_string(),
        }));
    }

    #[test]
    fn test_key_relationship_prefers_first_seen() {
        let mut link = LinkedEntity {
            entity_id: "x".to_string(),
            entity_name: "X".to_string(),
            entity_type: "Concept".to_string(),
            relationship: "LACKS".to_string(),
            relationship_types: ["LACKS", "REQUIRES"].iter().map(|s| s.to_string()).collect(),
            properties: Default::default(),
            source_files: Default::default(),
        };
        assert_eq!(key_relationship(&link), Some("LACKS"));

        link.relationship = "RELATES_TO".to_string();
        assert_eq!(key_relationship(&link), Some("REQUIRES"));

        link.relationship_types = ["RELATES_TO"].iter().map(|s| s.to_string()).collect();
        assert_eq!(key_relationship(&link), None);
    }
}
