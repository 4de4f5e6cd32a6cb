//! Entity extraction strategies.
//!
//! Both strategies implement [`EntityExtractor`](lexgraph_core::traits::EntityExtractor)
//! and never fail: problems degrade to an empty result.

mod llm;
pub mod repair;
mod rules;

pub use llm::LlmEntityExtractor;
pub use rules::RuleBasedExtractor;

/// Lower-snake id derived from a display name ("Mistake of Fact" ->
/// "mistake_of_fact").
pub fn slugify(name: &str) -> String {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("_")
}
