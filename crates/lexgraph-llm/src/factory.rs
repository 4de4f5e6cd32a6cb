//! Factory for creating LLM providers.

use std::sync::Arc;

use lexgraph_core::error::LexGraphResult;
use lexgraph_core::traits::{Llm, LlmConfig};

use crate::huggingface::HuggingFaceLlm;

/// Factory for creating LLM providers.
pub struct LlmFactory;

impl LlmFactory {
    /// Create an LLM provider from the given configuration.
    pub fn from_config(config: LlmConfig) -> LexGraphResult<Arc<dyn Llm>> {
        let llm = HuggingFaceLlm::new(config)?;
        Ok(Arc::new(llm))
    }

    /// Create a Hugging Face provider with default configuration.
    pub fn huggingface() -> LexGraphResult<Arc<dyn Llm>> {
        Self::from_config(LlmConfig::default())
    }

    /// Create a Hugging Face provider with a specific model.
    pub fn huggingface_with_model(model: impl Into<String>) -> LexGraphResult<Arc<dyn Llm>> {
        let config = LlmConfig {
            model: model.into(),
            ..Default::default()
        };
        Self::from_config(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_with_key() {
        let config = LlmConfig {
            api_key: Some("hf_test".to_string()),
            model: "meta-llama/Llama-3.1-8B-Instruct".to_string(),
            ..Default::default()
        };
        let llm = LlmFactory::from_config(config).unwrap();
        assert_eq!(llm.model_name(), "meta-llama/Llama-3.1-8B-Instruct");
    }
}
