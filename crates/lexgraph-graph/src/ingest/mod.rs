//! Document ingestion: loading, chunking and ingestion reports.

mod chunker;
pub mod loader;

use serde::{Deserialize, Serialize};

pub use chunker::TextChunker;
pub use loader::{download, download_client, load_file, LoadedDocument};

/// Outcome of ingesting one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngestionReport {
    /// Source name recorded on nodes and edges.
    pub file: String,
    pub chunks_processed: usize,
    pub entities_extracted: usize,
    pub relationships_extracted: usize,
    /// Graph size after the merge.
    pub total_nodes: usize,
    pub total_edges: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// One file of a folder ingestion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderEntry {
    pub file: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report: Option<IngestionReport>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of ingesting a folder.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FolderReport {
    pub files_processed: usize,
    pub results: Vec<FolderEntry>,
    pub total_nodes: usize,
    pub total_edges: usize,
}

impl FolderReport {
    /// Entries that failed.
    pub fn failures(&self) -> impl Iterator<Item = &FolderEntry> {
        self.results.iter().filter(|entry| entry.error.is_some())
    }
}
