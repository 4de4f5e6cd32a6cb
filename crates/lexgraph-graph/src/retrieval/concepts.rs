//! Keyword and bigram concept extraction.

use std::collections::HashSet;

use lexgraph_core::traits::ConceptExtractor;

/// Legal/policy vocabulary matched as substrings of the question.
pub const DEFAULT_KEYWORDS: &[&str] = &[
    "theft",
    "steal",
    "mobile",
    "phone",
    "property",
    "accident",
    "accidental",
    "intentional",
    "intent",
    "crime",
    "criminal",
    "illegal",
    "illegally",
    "require",
    "required",
    "must",
    "should",
    "approval",
    "consent",
    "permission",
    "data",
    "storage",
    "external",
    "server",
    "dpo",
    "data protection",
    "encryption",
];

/// Vocabulary keywords first, then adjacent-word bigrams.
#[derive(Debug, Clone)]
pub struct KeywordConceptExtractor {
    keywords: Vec<String>,
}

impl Default for KeywordConceptExtractor {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_KEYWORDS.iter().map(|k| k.to_string()).collect(),
        }
    }
}

impl KeywordConceptExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a custom vocabulary.
    pub fn with_keywords<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            keywords: keywords
                .into_iter()
                .map(|k| k.into().to_lowercase())
                .collect(),
        }
    }
}

impl ConceptExtractor for KeywordConceptExtractor {
    fn extract_concepts(&self, question: &str, limit: usize) -> Vec<String> {
        let question = question.to_lowercase();

        let keywords = self
            .keywords
            .iter()
            .filter(|k| !k.is_empty() && question.contains(k.as_str()))
            .cloned();

        let tokens: Vec<&str> = question
            .split_whitespace()
            .map(|t| t.trim_matches(|c: char| !c.is_alphanumeric()))
            .filter(|t| !t.is_empty())
            .collect();
        let bigrams = tokens.windows(2).map(|pair| format!("{} {}", pair[0], pair[1]));

        let mut seen = HashSet::new();
        keywords
            .chain(bigrams)
            .filter(|concept| seen.insert(concept.clone()))
            .take(limit)
            .collect()
    }
}
