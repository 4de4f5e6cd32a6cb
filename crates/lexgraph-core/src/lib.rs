//! lexgraph-core - Core library for lexgraph.
//!
//! This crate provides the shared types, traits, configuration and error
//! handling for the lexgraph knowledge-graph engine. Concrete graph storage,
//! extraction and retrieval live in `lexgraph-graph`; LLM providers live in
//! `lexgraph-llm`.
//!
//! # Example
//!
//! ```ignore
//! use lexgraph_core::{ExtractedEntity, ExtractionResult, LexGraphConfig};
//!
//! let config = LexGraphConfig::from_env();
//! let batch = ExtractionResult {
//!     entities: vec![ExtractedEntity::new("req_4_1", "Requirement", "Requirement 4.1")],
//!     relationships: vec![],
//! };
//! ```

pub mod config;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use config::{ChunkingConfig, LexGraphConfig, RetrievalConfig};
pub use error::{ErrorCode, LexGraphError, LexGraphResult};
pub use traits::{
    ConceptExtractor, DecisionMaker, EntityExtractor, GenerationOptions, Llm, LlmConfig,
    LlmResponse, ResponseFormat,
};
pub use types::{
    Decision, Edge, EntityKind, ExtractedEntity, ExtractedRelationship, ExtractionResult,
    Message, MessageRole, Node, PropertyMap, PropertyValue, RelationshipKind, RiskLevel, Verdict,
};
