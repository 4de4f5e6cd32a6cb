//! lexgraph-llm - LLM provider implementations for lexgraph.
//!
//! # Supported Providers
//!
//! - **Hugging Face Inference** - text generation with a chat-completion
//!   fallback, used for structured entity extraction.
//!
//! # Example
//!
//! ```ignore
//! use lexgraph_llm::LlmFactory;
//!
//! // Picks up HUGGINGFACE_API_KEY from the environment
//! let llm = LlmFactory::huggingface()?;
//! ```

mod factory;
mod huggingface;

pub use factory::LlmFactory;
pub use huggingface::HuggingFaceLlm;

// Re-export core types for convenience
pub use lexgraph_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse, ResponseFormat};
