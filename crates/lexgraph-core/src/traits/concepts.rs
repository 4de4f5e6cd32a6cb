//! Concept extraction strategy.

/// Pulls seed concepts (keywords, phrases) out of a question.
///
/// Results are recall-oriented and unranked; false positives are fine since
/// each concept only seeds entity matching.
pub trait ConceptExtractor: Send + Sync {
    /// Extract at most `limit` distinct concepts from `question`.
    fn extract_concepts(&self, question: &str, limit: usize) -> Vec<String>;
}
