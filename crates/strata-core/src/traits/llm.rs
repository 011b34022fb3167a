//! Chat model abstraction used by the oracle and the generate endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StrataResult;
use crate::types::Message;

/// One completion. `content` is `None` when the provider returned no choice.
#[derive(Debug, Clone, Default)]
pub struct LlmResponse {
    pub content: Option<String>,
    pub usage: Option<TokenUsage>,
}

impl LlmResponse {
    /// Create a response carrying only text.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            usage: None,
        }
    }

    pub fn content_or_empty(&self) -> &str {
        self.content.as_deref().unwrap_or("")
    }
}

#[derive(Debug, Clone, Default)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Per-call overrides of the provider's configured defaults.
#[derive(Debug, Clone, Default)]
pub struct GenerationOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    /// Ask for a single JSON object instead of free text.
    pub json: bool,
}

#[async_trait]
pub trait Llm: Send + Sync {
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse>;

    fn model_name(&self) -> &str;

    /// Whether `GenerationOptions::json` is honored natively.
    fn supports_json_mode(&self) -> bool {
        true
    }
}

/// Chat provider settings. An empty `model` selects the provider default.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Retries on transient provider failures.
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,
    /// API key (if not using environment variable).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

fn default_max_tokens() -> u32 {
    512
}

fn default_max_retries() -> usize {
    2
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: default_max_tokens(),
            max_retries: default_max_retries(),
            api_key: None,
            base_url: None,
        }
    }
}

/// LLM provider type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Ollama,
}
