//! Core traits for lexgraph providers and strategies.

mod concepts;
mod decision;
mod extractor;
mod llm;

pub use concepts::*;
pub use decision::*;
pub use extractor::*;
pub use llm::*;
