//! lexgraph-graph - Knowledge graph engine for lexgraph.
//!
//! This crate turns legal and policy documents into an incrementally merged
//! knowledge graph and answers questions from it.
//!
//! # Components
//!
//! - **Extraction** - LLM-backed and rule-based entity extractors
//! - **Graph** - petgraph-backed graph with idempotent merge semantics
//! - **Persistence** - SQLite snapshots plus a JSON mirror
//! - **Retrieval** - concept matching, relationships, traversal and paths
//! - **Service** - [`GraphRag`], the ingestion and question-answering facade
//!
//! # Example
//!
//! ```ignore
//! use lexgraph_core::LexGraphConfig;
//! use lexgraph_graph::GraphRag;
//!
//! let rag = GraphRag::new(LexGraphConfig::from_env())?;
//! rag.ingest_text("4.1 Approval from DPO is required.", "policy.txt", false).await?;
//! let answer = rag.answer_question("Does external storage need DPO approval?", "").await?;
//! println!("{}: {}", answer.decision, answer.answer);
//! ```

pub mod decision;
pub mod entity;
pub mod graph;
pub mod ingest;
pub mod persistence;
pub mod retrieval;
mod service;
mod store;

pub use entity::{LlmEntityExtractor, RuleBasedExtractor};
pub use graph::{GraphSnapshot, GraphStats, GraphView, KnowledgeGraph, MergeStats};
pub use ingest::{FolderEntry, FolderReport, IngestionReport, TextChunker};
pub use persistence::{GraphPersistence, NullPersistence, SqliteSnapshotStore};
pub use retrieval::{
    EntityMatch, EntityRelationships, GraphPath, KeywordConceptExtractor, QueryResult,
    RetrievalEngine, Traversal, TraversalHit,
};
pub use service::{GraphAnswer, GraphRag, DEFAULT_VIEW_LIMIT};
pub use store::GraphStore;

// Re-export core types for convenience
pub use lexgraph_core::traits::{ConceptExtractor, DecisionMaker, EntityExtractor};
pub use lexgraph_core::types::{Decision, RiskLevel, Verdict};
