//! LLM-based entity extraction.
//!
//! The extractor prompts an LLM for legal/policy entities and relationships
//! as JSON and converts the reply leniently:
//!
//! 1. The chunk is sent with a structured prompt (temperature 0.1, JSON)
//! 2. The reply is repaired and parsed (see [`super::repair`])
//! 3. Each entity and relationship is converted on its own, so one malformed
//!    element does not discard the rest
//! 4. Type labels are normalized to the legal vocabulary where they match

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use lexgraph_core::traits::{EntityExtractor, GenerationOptions, Llm, ResponseFormat};
use lexgraph_core::types::{
    EntityKind, ExtractedEntity, ExtractedRelationship, ExtractionResult, Message, PropertyMap,
    PropertyValue, RelationshipKind,
};

use super::repair::parse_lenient;
use super::slugify;

/// Raw JSON structures for LLM response parsing.
mod raw {
    use serde::Deserialize;
    use serde_json::Value;

    #[derive(Debug, Deserialize)]
    pub struct RawEntity {
        #[serde(default, alias = "entity_id", alias = "key")]
        pub id: Option<Value>,
        #[serde(default, alias = "type", alias = "entityType", alias = "label")]
        pub entity_type: Option<String>,
        #[serde(default, alias = "entity_name", alias = "title")]
        pub name: Option<String>,
        #[serde(default)]
        pub description: Option<String>,
        #[serde(default, alias = "attributes")]
        pub properties: Option<Value>,
    }

    #[derive(Debug, Deserialize)]
    pub struct RawRelationship {
        #[serde(default, alias = "from", alias = "source_id", alias = "head")]
        pub source: Option<Value>,
        #[serde(default, alias = "to", alias = "target_id", alias = "tail")]
        pub target: Option<Value>,
        #[serde(
            default,
            alias = "type",
            alias = "relationshipType",
            alias = "relation",
            alias = "rel_type"
        )]
        pub relationship_type: Option<String>,
        #[serde(default)]
        pub properties: Option<Value>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct RawExtractionResult {
        #[serde(default, alias = "nodes")]
        pub entities: Vec<Value>,
        #[serde(default, alias = "edges", alias = "relations")]
        pub relationships: Vec<Value>,
    }

    /// Ids may come back as numbers.
    pub fn value_to_string(value: &Value) -> Option<String> {
        match value {
            Value::String(s) => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
        .filter(|s| !s.is_empty())
    }
}

/// Entity extractor backed by an [`Llm`].
pub struct LlmEntityExtractor {
    llm: Arc<dyn Llm>,
}

impl LlmEntityExtractor {
    /// Create a new LLM entity extractor.
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    /// Build the extraction prompt for one chunk.
    fn prompt(text_chunk: &str) -> String {
        let entity_types: Vec<&str> = EntityKind::all()
            .iter()
            .filter(|k| **k != EntityKind::Unknown)
            .map(|k| k.as_str())
            .collect();
        let relationship_types: Vec<&str> =
            RelationshipKind::all().iter().map(|k| k.as_str()).collect();

        format!(
            r#"Extract entities and relationships from this legal/policy text. Focus on:

1. CRIMES/VIOLATIONS (e.g., "Theft", "Fraud", "Assault")
2. LEGAL ELEMENTS (e.g., "Intent", "Act", "Knowledge")
3. LEGAL CONCEPTS (e.g., "Accidental Act", "Mistake of Fact", "Consent")
4. REQUIREMENTS/POLICIES (e.g., "DPO Approval", "Encryption Required")
5. SECTIONS/SUBSECTIONS (e.g., "Section 4.2", "Section 5.1")
6. RELATIONSHIPS between them ({rel_types})

Text to analyze:
{text_chunk}

Respond ONLY with a valid JSON object in this format:
{{
  "entities": [
    {{"id": "entity_1", "type": "{entity_types}", "name": "entity name", "properties": {{"description": "...", "section": "..."}}}}
  ],
  "relationships": [
    {{"source": "entity_1", "target": "entity_2", "type": "{rel_pipe}", "properties": {{}}}}
  ]
}}

Output ONLY the JSON, no other text:"#,
            rel_types = relationship_types.join(", "),
            text_chunk = text_chunk,
            entity_types = entity_types.join("|"),
            rel_pipe = relationship_types.join("|"),
        )
    }

    /// Parse an LLM reply into an extraction result. Never fails.
    pub fn parse_response(content: &str) -> ExtractionResult {
        let Some(raw) = parse_lenient::<raw::RawExtractionResult>(content) else {
            if !content.trim().is_empty() {
                tracing::warn!("Failed to parse extraction response; using empty result");
            }
            return ExtractionResult::default();
        };

        let entities: Vec<ExtractedEntity> = raw
            .entities
            .into_iter()
            .filter_map(|value| serde_json::from_value::<raw::RawEntity>(value).ok())
            .filter_map(Self::convert_entity)
            .collect();

        // Let relationships refer to entities by name as well as by id
        let names: HashMap<String, String> = entities
            .iter()
            .map(|e| (e.name.to_lowercase(), e.id.clone()))
            .collect();

        let relationships = raw
            .relationships
            .into_iter()
            .filter_map(|value| serde_json::from_value::<raw::RawRelationship>(value).ok())
            .filter_map(|r| Self::convert_relationship(r, &entities, &names))
            .collect();

        ExtractionResult {
            entities,
            relationships,
        }
    }

    fn convert_entity(raw: raw::RawEntity) -> Option<ExtractedEntity> {
        let name = raw
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string);
        let id = raw
            .id
            .as_ref()
            .and_then(raw::value_to_string)
            .or_else(|| name.as_deref().map(slugify).filter(|s| !s.is_empty()))?;

        let entity_type = EntityKind::normalize(raw.entity_type.as_deref().unwrap_or_default());
        let mut entity = ExtractedEntity::new(id.clone(), entity_type, name.unwrap_or(id));
        entity.properties = convert_properties(raw.properties.as_ref());

        if let Some(description) = raw.description.as_deref().map(str::trim) {
            if !description.is_empty() && !entity.properties.contains_key("description") {
                entity
                    .properties
                    .insert("description".to_string(), PropertyValue::from(description));
            }
        }

        Some(entity)
    }

    fn convert_relationship(
        raw: raw::RawRelationship,
        entities: &[ExtractedEntity],
        names: &HashMap<String, String>,
    ) -> Option<ExtractedRelationship> {
        let resolve = |endpoint: String| -> String {
            if entities.iter().any(|e| e.id == endpoint) {
                return endpoint;
            }
            names.get(&endpoint.to_lowercase()).cloned().unwrap_or(endpoint)
        };

        let source = resolve(raw.source.as_ref().and_then(raw::value_to_string)?);
        let target = resolve(raw.target.as_ref().and_then(raw::value_to_string)?);
        let relationship_type =
            RelationshipKind::normalize(raw.relationship_type.as_deref().unwrap_or_default());

        let mut relationship = ExtractedRelationship::new(source, target, relationship_type);
        relationship.properties = convert_properties(raw.properties.as_ref());
        Some(relationship)
    }
}

fn convert_properties(value: Option<&serde_json::Value>) -> PropertyMap {
    let Some(serde_json::Value::Object(map)) = value else {
        return PropertyMap::new();
    };
    map.iter()
        .filter_map(|(key, value)| PropertyValue::from_json(value).map(|v| (key.clone(), v)))
        .collect()
}

#[async_trait]
impl EntityExtractor for LlmEntityExtractor {
    async fn extract(&self, text_chunk: &str, _source_file: &str) -> ExtractionResult {
        let text_chunk = text_chunk.trim();
        if text_chunk.is_empty() {
            return ExtractionResult::default();
        }

        let messages = vec![Message::user(Self::prompt(text_chunk))];
        let options = GenerationOptions {
            temperature: Some(0.1),
            max_tokens: Some(2000),
            response_format: Some(ResponseFormat::Json),
            ..Default::default()
        };

        match self.llm.generate(&messages, Some(options)).await {
            Ok(response) => {
                let result = Self::parse_response(response.content_or_empty());
                tracing::debug!(
                    "LLM extraction: {} entities, {} relationships",
                    result.entity_count(),
                    result.relationship_count()
                );
                result
            }
            Err(e) => {
                tracing::warn!("LLM extraction failed, using empty result: {}", e);
                ExtractionResult::default()
            }
        }
    }

    fn name(&self) -> &str {
        "llm"
    }
}
