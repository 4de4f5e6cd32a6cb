//! Graph-only decisions, used when no decision-maker is configured or the
//! configured one fails.

use lexgraph_core::types::{Decision, RelationshipKind, RiskLevel, Verdict};

use crate::retrieval::{ExpandedEntity, QueryResult};

const ANSWER_ENTITIES: usize = 3;
const ANSWER_SENTENCES: usize = 5;

const NO_MATCHES: &str = "No relevant entities found in the knowledge graph for this question.";

/// Reason text built purely from graph relationships.
pub fn graph_answer_text(result: &QueryResult) -> String {
    let mut text = String::from("Based on the knowledge graph:\n\n");

    if result.matched_entities.is_empty() {
        text.push_str(NO_MATCHES);
        return text;
    }

    let sentences: Vec<String> = result
        .related_info
        .iter()
        .take(ANSWER_ENTITIES)
        .flat_map(relationship_sentences)
        .take(ANSWER_SENTENCES)
        .collect();

    if sentences.is_empty() {
        text.push_str("Found relevant entities but no clear relationships to answer the question.");
    } else {
        text.push_str(&sentences.join("\n"));
        text.push_str("\n\nRelationship analysis from knowledge graph.");
    }
    text
}

fn relationship_sentences(info: &ExpandedEntity) -> Vec<String> {
    let name = &info.entity.name;
    let mut sentences = Vec::new();

    for link in &info.relationships.outgoing {
        let sentence = if link.has_type(RelationshipKind::IsNot.as_str()) {
            format!("{} is not {}.", name, link.entity_name)
        } else if link.has_type(RelationshipKind::Lacks.as_str()) {
            format!("{} lacks {}.", name, link.entity_name)
        } else if link.has_type(RelationshipKind::Requires.as_str()) {
            format!("{} requires {}.", name, link.entity_name)
        } else {
            continue;
        };
        sentences.push(sentence);
    }
    for link in &info.relationships.incoming {
        if link.has_type(RelationshipKind::Requires.as_str()) {
            sentences.push(format!("{} requires {}.", link.entity_name, name));
        }
    }

    sentences
}

/// Coarse verdict from the relationship types around the matches: any
/// IS_NOT means "Not a Crime", otherwise any REQUIRES means "Conditional".
pub fn graph_verdict(result: &QueryResult) -> Verdict {
    let has = |kind: RelationshipKind| {
        let kind = kind.as_str();
        result.related_info.iter().any(|info| {
            info.relationships
                .outgoing
                .iter()
                .chain(&info.relationships.incoming)
                .any(|link| link.has_type(kind))
                || info
                    .traversal
                    .related
                    .iter()
                    .any(|hit| hit.relationship_types.contains(kind))
        })
    };

    if has(RelationshipKind::IsNot) {
        Verdict::NotACrime
    } else if has(RelationshipKind::Requires) {
        Verdict::Conditional
    } else {
        Verdict::Unknown
    }
}

const NOT_A_CRIME_PHRASES: &[&str] = &[
    "not a crime",
    "not crime",
    "not illegal",
    "not violate",
    "no, it is not",
    "no, this is not",
];
const IS_A_CRIME_PHRASES: &[&str] = &["is a crime", "is illegal", "is violate", "yes, it is", "yes, this is"];
const CONDITIONAL_PHRASES: &[&str] = &["conditional", "depends", "may be"];

/// Verdict read from a decision-maker's reason text.
///
/// Negative phrasings are checked first so "is not a crime" never reads as
/// "is a crime".
pub fn verdict_from_reason(reason: &str) -> Verdict {
    let reason = reason.to_lowercase();
    let mentions = |phrases: &[&str]| phrases.iter().any(|p| reason.contains(p));

    if mentions(NOT_A_CRIME_PHRASES) {
        Verdict::NotACrime
    } else if mentions(IS_A_CRIME_PHRASES) {
        Verdict::IsACrime
    } else if mentions(CONDITIONAL_PHRASES) {
        Verdict::Conditional
    } else {
        Verdict::Unknown
    }
}

/// A complete decision derived from the graph alone.
pub fn fallback_decision(result: &QueryResult) -> Decision {
    let matched = !result.matched_entities.is_empty();

    let suggested_changes = if matched {
        Vec::new()
    } else {
        vec!["Ingest relevant documents to build knowledge graph".to_string()]
    };

    Decision {
        decision: graph_verdict(result),
        reason: graph_answer_text(result),
        risk_level: RiskLevel::Medium,
        confidence_score: if matched { 0.5 } else { 0.0 },
        suggested_changes,
        alternative_actions: Vec::new(),
        references: result
            .matched_entities
            .iter()
            .take(ANSWER_ENTITIES)
            .map(|e| format!("Graph entity: {}", e.name))
            .collect(),
    }
}
