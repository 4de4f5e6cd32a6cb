//! Graph retrieval for question answering.
//!
//! A question is reduced to seed concepts, each concept is matched against
//! the graph, and the strongest matches are expanded with their direct
//! relationships and a bounded traversal:
//! - [`RetrievalEngine`]: matching, relationships, traversal, paths
//! - [`KeywordConceptExtractor`]: default concept extraction
//! - [`format_evidence`]: the text handed to the decision-maker

mod concepts;
mod context;
mod engine;
mod types;

pub use concepts::{KeywordConceptExtractor, DEFAULT_KEYWORDS};
pub use context::{build_context, extract_graph_paths, format_evidence, key_relationship};
pub use engine::{RetrievalEngine, DEFAULT_MAX_PATH_LENGTH};
pub use types::{
    EntityMatch, EntityRelationships, ExpandedEntity, GraphPath, LinkedEntity, QueryResult,
    Traversal, TraversalHit,
};
