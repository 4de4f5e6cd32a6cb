//! Character-bounded text chunking.
//!
//! Chunks are cut at the coarsest semantic boundary that still fits
//! (paragraphs, lines, sentences, words, characters). Each chunk holds at
//! most `chunk_size` characters and shares up to `chunk_overlap` characters
//! with its predecessor.

use std::fmt;

use text_splitter::{Characters, ChunkConfig, TextSplitter};
use tracing::debug;

use lexgraph_core::config::ChunkingConfig;
use lexgraph_core::error::{LexGraphError, LexGraphResult};

/// Splits documents into overlapping chunks for extraction.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
    splitter: TextSplitter<Characters>,
}

impl TextChunker {
    /// Create a chunker; sizes are in characters.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> LexGraphResult<Self> {
        if chunk_size == 0 {
            return Err(LexGraphError::validation("chunk_size must be greater than 0"));
        }
        if chunk_overlap >= chunk_size {
            return Err(LexGraphError::validation_with_suggestion(
                format!(
                    "chunk_overlap ({}) must be smaller than chunk_size ({})",
                    chunk_overlap, chunk_size
                ),
                "Lower chunking.chunk_overlap or raise chunking.chunk_size",
            ));
        }

        let config = ChunkConfig::new(chunk_size)
            .with_overlap(chunk_overlap)
            .map_err(|e| LexGraphError::validation(format!("Invalid chunk config: {}", e)))?;

        Ok(Self {
            chunk_size,
            chunk_overlap,
            splitter: TextSplitter::new(config),
        })
    }

    pub fn from_config(config: &ChunkingConfig) -> LexGraphResult<Self> {
        Self::new(config.chunk_size, config.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Split `text` into trimmed, non-empty chunks.
    pub fn split(&self, text: &str) -> Vec<String> {
        let chunks: Vec<String> = self
            .splitter
            .chunks(text)
            .map(str::trim)
            .filter(|chunk| !chunk.is_empty())
            .map(str::to_string)
            .collect();

        debug!(chunk_count = chunks.len(), "Chunking complete");
        chunks
    }
}

impl fmt::Debug for TextChunker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextChunker")
            .field("chunk_size", &self.chunk_size)
            .field("chunk_overlap", &self.chunk_overlap)
            .finish()
    }
}
