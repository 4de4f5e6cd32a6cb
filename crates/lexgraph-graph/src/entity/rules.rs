//! Rule-based entity extraction for numbered policy documents.
//!
//! A line-oriented regex scan that needs no external service:
//!
//! - `Section 4: Data Storage` or `4.2 - Retention` opens a Section and makes
//!   it the current section
//! - `4.1 Approval from DPO is required.` becomes a Requirement, contained in
//!   the current section when one is open
//! - a requirement mentioning an approval and a named authority (DPO, CISO,
//!   legal, ...) also yields an "<Authority> Approval Required" requirement
//!   that the line REQUIRES

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use lexgraph_core::traits::EntityExtractor;
use lexgraph_core::types::{
    EntityKind, ExtractedEntity, ExtractedRelationship, ExtractionResult, RelationshipKind,
};

static SECTION_HEADER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[Ss]ection\s+(\d+(?:\.\d+)*)|(\d+\.\d+)\s*[:\-–—])").expect("valid regex")
});

static SECTION_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[:\-–—]\s*(.+)").expect("valid regex"));

static REQUIREMENT_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d+\.\d+)\s+(.+)").expect("valid regex"));

static APPROVAL_KEYWORD: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)approv|consent|authori[sz]ation|authori[sz]e|sign[\s-]?off|permission")
        .expect("valid regex")
});

/// Authorities whose approval gets its own requirement node:
/// (pattern, id slug, display name).
static AUTHORITIES: Lazy<Vec<(Regex, &'static str, &'static str)>> = Lazy::new(|| {
    [
        (r"(?i)\bdpo\b", "dpo", "DPO"),
        (r"(?i)\bciso\b", "ciso", "CISO"),
        (r"(?i)\blegal\b", "legal", "Legal"),
        (r"(?i)\bcompliance\b", "compliance", "Compliance"),
        (r"(?i)\bsecurity\s+team\b", "security_team", "Security Team"),
        (r"(?i)\bmanager\b", "manager", "Manager"),
        (r"(?i)\bboard\b", "board", "Board"),
    ]
    .into_iter()
    .map(|(pattern, slug, display)| (Regex::new(pattern).expect("valid regex"), slug, display))
    .collect()
});

/// Regex-driven extractor for section/requirement style documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedExtractor;

impl RuleBasedExtractor {
    pub fn new() -> Self {
        Self
    }

    /// Scan `text_chunk` line by line.
    pub fn extract_sync(&self, text_chunk: &str, source_file: &str) -> ExtractionResult {
        let mut result = ExtractionResult::default();
        let mut current_section: Option<String> = None;

        for line in text_chunk.lines().map(str::trim).filter(|l| !l.is_empty()) {
            if let Some(caps) = SECTION_HEADER.captures(line) {
                let number = caps
                    .get(1)
                    .or_else(|| caps.get(2))
                    .map(|m| m.as_str())
                    .unwrap_or_default();
                let section_id = format!("section_{}", number.replace('.', "_"));
                let title = SECTION_TITLE
                    .captures(line)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
                    .unwrap_or_else(|| format!("Section {}", number));

                result.entities.push(
                    ExtractedEntity::new(
                        section_id.clone(),
                        EntityKind::Section.as_str(),
                        format!("Section {}", number),
                    )
                    .with_property("section_number", number)
                    .with_property("title", title)
                    .with_property("source_file", source_file)
                    .with_property("content", line),
                );
                current_section = Some(section_id);
            }

            if let Some(caps) = REQUIREMENT_LINE.captures(line) {
                let number = &caps[1];
                let text = caps[2].trim();
                let requirement_id = format!("req_{}", number.replace('.', "_"));

                result.entities.push(
                    ExtractedEntity::new(
                        requirement_id.clone(),
                        EntityKind::Requirement.as_str(),
                        format!("Requirement {}", number),
                    )
                    .with_property("requirement_number", number)
                    .with_property("text", text)
                    .with_property("source_file", source_file),
                );

                if let Some(section_id) = &current_section {
                    result.relationships.push(ExtractedRelationship::new(
                        section_id.clone(),
                        requirement_id.clone(),
                        RelationshipKind::Contains.as_str(),
                    ));
                }

                Self::synthesize_approvals(&requirement_id, text, source_file, &mut result);
            }
        }

        result
    }

    fn synthesize_approvals(
        requirement_id: &str,
        text: &str,
        source_file: &str,
        result: &mut ExtractionResult,
    ) {
        if !APPROVAL_KEYWORD.is_match(text) {
            return;
        }

        for (pattern, slug, display) in AUTHORITIES.iter() {
            if !pattern.is_match(text) {
                continue;
            }
            let approval_id = format!("req_{}_approval", slug);
            result.entities.push(
                ExtractedEntity::new(
                    approval_id.clone(),
                    EntityKind::Requirement.as_str(),
                    format!("{} Approval Required", display),
                )
                .with_property("authority", *display)
                .with_property("source_file", source_file),
            );
            result.relationships.push(ExtractedRelationship::new(
                requirement_id,
                approval_id,
                RelationshipKind::Requires.as_str(),
            ));
        }
    }
}

#[async_trait]
impl EntityExtractor for RuleBasedExtractor {
    async fn extract(&self, text_chunk: &str, source_file: &str) -> ExtractionResult {
        let result = self.extract_sync(text_chunk, source_file);
        tracing::debug!(
            "Rule-based extraction from {}: {} entities, {} relationships",
            source_file,
            result.entity_count(),
            result.relationship_count()
        );
        result
    }

    fn name(&self) -> &str {
        "rule-based"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexgraph_core::types::PropertyValue;

    fn text(entity: &ExtractedEntity, key: &str) -> Option<String> {
        entity.properties.get(key).map(PropertyValue::to_display_string)
    }

    #[test]
    fn test_dpo_requirement() {
        let result = RuleBasedExtractor::new().extract_sync("4.1 Approval from DPO is required.", "policy.txt");

        let ids: Vec<&str> = result.entities.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["req_4_1", "req_dpo_approval"]);
        assert_eq!(result.entities[0].entity_type, "Requirement");
        assert_eq!(text(&result.entities[0], "text").as_deref(), Some("Approval from DPO is required."));
        assert_eq!(result.entities[1].name, "DPO Approval Required");

        assert_eq!(result.relationships.len(), 1);
        let rel = &result.relationships[0];
        assert_eq!((rel.source.as_str(), rel.target.as_str()), ("req_4_1", "req_dpo_approval"));
        assert_eq!(rel.relationship_type, "REQUIRES");
    }

    #[test]
    fn test_sections_contain_requirements() {
        let chunk = "Section 4: Data Storage\n\n4.1 Data must be encrypted at rest.\n4.2 External storage needs sign-off from the CISO and Legal.\n";
        let result = RuleBasedExtractor::new().extract_sync(chunk, "storage.txt");

        let section = &result.entities[0];
        assert_eq!(section.id, "section_4");
        assert_eq!(section.entity_type, "Section");
        assert_eq!(section.name, "Section 4");
        assert_eq!(text(section, "title").as_deref(), Some("Data Storage"));
        assert_eq!(text(section, "source_file").as_deref(), Some("storage.txt"));

        let pairs: Vec<(&str, &str, &str)> = result
            .relationships
            .iter()
            .map(|r| (r.source.as_str(), r.target.as_str(), r.relationship_type.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("section_4", "req_4_1", "CONTAINS"),
                ("section_4", "req_4_2", "CONTAINS"),
                ("req_4_2", "req_ciso_approval", "REQUIRES"),
                ("req_4_2", "req_legal_approval", "REQUIRES"),
            ]
        );
    }

    #[test]
    fn test_dash_header_and_dotted_section_numbers() {
        let chunk = "Section 5.1 - Retention\n5.1.3 ignored deeper numbering\n2.3 — Scope";
        let result = RuleBasedExtractor::new().extract_sync(chunk, "retention.txt");

        assert_eq!(result.entities[0].id, "section_5_1");
        assert_eq!(text(&result.entities[0], "title").as_deref(), Some("Retention"));
        assert!(result.entities.iter().any(|e| e.id == "section_2_3"));
    }

    #[test]
    fn test_authority_needs_approval_keyword_and_word_boundary() {
        let result = RuleBasedExtractor::new().extract_sync(
            "7.1 The manager reviews logs weekly.\n7.2 Approval by the onboarding team is required.",
            "ops.txt",
        );
        assert!(result.entities.iter().all(|e| !e.id.ends_with("_approval")));
    }

    #[tokio::test]
    async fn test_trait_extract_matches_sync() {
        let extractor = RuleBasedExtractor::new();
        let chunk = "3.4 Consent from the Board is required.";
        let via_trait = extractor.extract(chunk, "gov.txt").await;
        assert_eq!(via_trait, extractor.extract_sync(chunk, "gov.txt"));
        assert!(via_trait.entities.iter().any(|e| e.id == "req_board_approval"));
    }
}
