//! Entity extraction trait.

use async_trait::async_trait;

use crate::types::ExtractionResult;

/// Turns a text chunk into candidate entities and relationships.
///
/// Implementations never fail: an unreachable service or malformed output
/// degrades to an empty [`ExtractionResult`].
#[async_trait]
pub trait EntityExtractor: Send + Sync {
    /// Extract entities and relationships from one chunk of `source_file`.
    async fn extract(&self, text_chunk: &str, source_file: &str) -> ExtractionResult;

    /// Short strategy name for logs and reports.
    fn name(&self) -> &str;
}
