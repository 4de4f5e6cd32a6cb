//! Configuration system for lexgraph.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{LexGraphError, LexGraphResult};
use crate::traits::LlmConfig;

/// Text chunking parameters (character counts).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum characters per chunk.
    pub chunk_size: usize,
    /// Characters shared between consecutive chunks.
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 2000,
            chunk_overlap: 200,
        }
    }
}

/// Bounds used by graph retrieval.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Maximum concepts pulled from a question.
    pub max_concepts: usize,
    /// Entity matches kept per concept.
    pub matches_per_concept: usize,
    /// Matched entities reported by a query.
    pub max_matched_entities: usize,
    /// Matched entities expanded with relationships and traversal.
    pub max_expanded_entities: usize,
    /// Traversal depth used during expansion.
    pub traversal_depth: usize,
    /// Maximum paths returned by path finding.
    pub max_paths: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_concepts: 10,
            matches_per_concept: 5,
            max_matched_entities: 10,
            max_expanded_entities: 5,
            traversal_depth: 2,
            max_paths: 10,
        }
    }
}

/// Main lexgraph configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LexGraphConfig {
    /// Directory holding the graph snapshot and its JSON mirror.
    pub graph_db_path: PathBuf,
    /// LLM configuration for entity extraction.
    pub llm: LlmConfig,
    /// Prefer LLM extraction when an LLM is available.
    pub use_llm: bool,
    /// Chunking configuration.
    pub chunking: ChunkingConfig,
    /// Retrieval configuration.
    pub retrieval: RetrievalConfig,
}

impl Default for LexGraphConfig {
    fn default() -> Self {
        let lexgraph_dir = dirs::home_dir()
            .map(|h| h.join(".lexgraph"))
            .unwrap_or_else(|| PathBuf::from(".lexgraph"));

        Self {
            graph_db_path: lexgraph_dir.join("graph_db"),
            llm: LlmConfig::default(),
            use_llm: true,
            chunking: ChunkingConfig::default(),
            retrieval: RetrievalConfig::default(),
        }
    }
}

impl LexGraphConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<Path>) -> LexGraphResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| LexGraphError::Configuration(e.to_string()))
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| LexGraphError::Configuration(e.to_string())),
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| LexGraphError::Configuration(e.to_string())),
            _ => Err(LexGraphError::Configuration(
                "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
            )),
        }
    }

    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("LEXGRAPH_GRAPH_DB_PATH") {
            config.graph_db_path = PathBuf::from(path);
        }
        if let Ok(model) = std::env::var("LEXGRAPH_LLM_MODEL") {
            config.llm.model = model;
        }
        if let Ok(api_key) = std::env::var("HUGGINGFACE_API_KEY") {
            config.llm.api_key = Some(api_key);
        }
        if let Ok(base_url) = std::env::var("LEXGRAPH_LLM_BASE_URL") {
            config.llm.base_url = Some(base_url);
        }
        if let Ok(use_llm) = std::env::var("LEXGRAPH_USE_LLM") {
            config.use_llm = !matches!(use_llm.to_lowercase().as_str(), "0" | "false" | "no");
        }

        config
    }

    /// Set the graph directory.
    pub fn with_graph_db_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.graph_db_path = path.into();
        self
    }

    /// Whether an API key is available for LLM extraction.
    pub fn has_llm_credentials(&self) -> bool {
        self.llm.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
