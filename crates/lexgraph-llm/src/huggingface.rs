//! Hugging Face Inference provider implementation.
//!
//! Generation first goes to the text-generation endpoint; if that request
//! fails or comes back empty, the same prompt is sent once to the
//! OpenAI-compatible chat-completion endpoint. There is no other retry.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lexgraph_core::error::{LexGraphError, LexGraphResult};
use lexgraph_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse, TokenUsage};
use lexgraph_core::types::{messages_to_prompt, Message, MessageRole};

const HF_INFERENCE_URL: &str = "https://api-inference.huggingface.co";
const HF_ROUTER_URL: &str = "https://router.huggingface.co";

/// Hugging Face Inference LLM provider.
pub struct HuggingFaceLlm {
    client: Client,
    config: LlmConfig,
    text_generation_url: String,
    chat_completion_url: String,
}

#[derive(Debug, Serialize)]
struct TextGenerationRequest {
    inputs: String,
    parameters: TextGenerationParameters,
}

#[derive(Debug, Serialize)]
struct TextGenerationParameters {
    max_new_tokens: u32,
    temperature: f32,
    top_p: f32,
    return_full_text: bool,
}

#[derive(Debug, Deserialize)]
struct GeneratedText {
    generated_text: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TextGenerationResponse {
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    top_p: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<ChatUsage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatChoiceMessage>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct HfError {
    error: String,
}

impl HuggingFaceLlm {
    /// Create a new Hugging Face provider.
    pub fn new(config: LlmConfig) -> LexGraphResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("HUGGINGFACE_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or_else(|| {
                LexGraphError::Configuration("Hugging Face API key not found. Set HUGGINGFACE_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        let mut headers = reqwest::header::HeaderMap::new();
        headers.insert(
            reqwest::header::AUTHORIZATION,
            format!("Bearer {}", api_key)
                .parse()
                .map_err(|_| LexGraphError::Configuration("Invalid API key format".to_string()))?,
        );

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| {
                LexGraphError::Configuration(format!("Failed to create HTTP client: {}", e))
            })?;

        let (text_generation_base, chat_base) = match config.base_url.as_deref() {
            Some(base) => {
                let parsed = url::Url::parse(base).map_err(|e| {
                    LexGraphError::Configuration(format!("Invalid inference URL: {}", e))
                })?;
                let base = parsed.as_str().trim_end_matches('/').to_string();
                (base.clone(), base)
            }
            None => (HF_INFERENCE_URL.to_string(), HF_ROUTER_URL.to_string()),
        };

        let mut config = config;
        if config.model.is_empty() {
            config.model = LlmConfig::default().model;
        }

        Ok(Self {
            client,
            text_generation_url: format!("{}/models/{}", text_generation_base, config.model),
            chat_completion_url: format!("{}/v1/chat/completions", chat_base),
            config,
        })
    }

    async fn text_generation(
        &self,
        prompt: String,
        options: &GenerationOptions,
    ) -> LexGraphResult<LlmResponse> {
        let request = TextGenerationRequest {
            inputs: prompt,
            parameters: TextGenerationParameters {
                max_new_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
                temperature: options.temperature.unwrap_or(self.config.temperature),
                top_p: options.top_p.unwrap_or(self.config.top_p),
                return_full_text: false,
            },
        };

        let body = self.post(&self.text_generation_url, &request).await?;
        let content = parse_text_generation(&body)?;
        if content.trim().is_empty() {
            return Err(LexGraphError::llm("Empty response from text generation"));
        }
        Ok(LlmResponse::text(content.trim()))
    }

    async fn chat_completion(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> LexGraphResult<LlmResponse> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: messages
                .iter()
                .map(|m| ChatMessage {
                    role: match m.role {
                        MessageRole::System => "system",
                        MessageRole::User => "user",
                        MessageRole::Assistant => "assistant",
                    },
                    content: m.content.clone(),
                })
                .collect(),
            max_tokens: options.max_tokens.unwrap_or(self.config.max_tokens),
            temperature: options.temperature.unwrap_or(self.config.temperature),
            top_p: options.top_p.unwrap_or(self.config.top_p),
        };

        let body = self.post(&self.chat_completion_url, &request).await?;
        let response = parse_chat_completion(&body)?;
        if response.content_or_empty().trim().is_empty() {
            return Err(LexGraphError::llm("Empty response from chat completion"));
        }
        Ok(response)
    }

    async fn post<T: Serialize + ?Sized>(&self, url: &str, request: &T) -> LexGraphResult<String> {
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .await
            .map_err(|e| LexGraphError::llm_connection(format!("Inference request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| LexGraphError::llm_connection(format!("Failed to read response body: {}", e)))?;

        if !status.is_success() {
            let message = serde_json::from_str::<HfError>(&body)
                .map(|e| e.error)
                .unwrap_or_else(|_| body.clone());
            return Err(LexGraphError::llm(format!(
                "Inference API error ({}): {}",
                status, message
            )));
        }

        Ok(body)
    }
}

/// Parse a text-generation body (`[{"generated_text": ..}]` or a single object).
fn parse_text_generation(body: &str) -> LexGraphResult<String> {
    let parsed: TextGenerationResponse = serde_json::from_str(body)
        .map_err(|e| LexGraphError::llm_invalid_response(format!("Failed to parse response: {}", e)))?;

    Ok(match parsed {
        TextGenerationResponse::Batch(items) => items
            .into_iter()
            .next()
            .map(|g| g.generated_text)
            .unwrap_or_default(),
        TextGenerationResponse::Single(g) => g.generated_text,
    })
}

/// Parse an OpenAI-compatible chat-completion body.
fn parse_chat_completion(body: &str) -> LexGraphResult<LlmResponse> {
    let parsed: ChatResponse = serde_json::from_str(body)
        .map_err(|e| LexGraphError::llm_invalid_response(format!("Failed to parse response: {}", e)))?;

    let content = parsed.choices.into_iter().next().and_then(|choice| {
        choice
            .message
            .and_then(|m| m.content)
            .or(choice.text)
    });

    Ok(LlmResponse {
        content: content.map(|c| c.trim().to_string()),
        usage: parsed.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

#[async_trait]
impl Llm for HuggingFaceLlm {
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> LexGraphResult<LlmResponse> {
        let options = options.unwrap_or_default();

        match self.text_generation(messages_to_prompt(messages), &options).await {
            Ok(response) => Ok(response),
            Err(text_error) => {
                tracing::debug!(
                    "Text generation failed, falling back to chat completion: {}",
                    text_error
                );
                self.chat_completion(messages, &options).await.map_err(|chat_error| {
                    LexGraphError::llm(format!(
                        "Both text generation and chat completion failed. Text error: {}. Chat error: {}",
                        text_error, chat_error
                    ))
                })
            }
        }
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
