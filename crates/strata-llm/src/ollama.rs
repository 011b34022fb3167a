//! Ollama LLM provider implementation.

use async_trait::async_trait;

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse};
use strata_core::types::Message;

#[cfg(feature = "ollama")]
use ollama_rs::{
    generation::chat::{ChatMessage, ChatMessageRequest, MessageRole as OllamaRole},
    generation::options::GenerationOptions as OllamaOptions,
    Ollama,
};
#[cfg(feature = "ollama")]
use strata_core::types::MessageRole;

const DEFAULT_BASE_URL: &str = "http://localhost:11434";
const DEFAULT_MODEL: &str = "llama3.1";

/// Ollama LLM provider.
pub struct OllamaLlm {
    #[cfg(feature = "ollama")]
    client: Ollama,
    config: LlmConfig,
}

impl OllamaLlm {
    /// Create a new Ollama LLM provider.
    pub fn new(config: LlmConfig) -> StrataResult<Self> {
        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let url = url::Url::parse(&base_url)
            .map_err(|e| StrataError::Configuration(format!("Invalid Ollama URL: {}", e)))?;

        #[cfg(feature = "ollama")]
        let client = Ollama::new(
            format!(
                "{}://{}",
                url.scheme(),
                url.host_str().unwrap_or("localhost")
            ),
            url.port().unwrap_or(11434),
        );
        #[cfg(not(feature = "ollama"))]
        let _ = url;

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            #[cfg(feature = "ollama")]
            client,
            config,
        })
    }

    #[cfg(feature = "ollama")]
    fn message_to_ollama(msg: &Message) -> ChatMessage {
        ChatMessage {
            role: match msg.role {
                MessageRole::System => OllamaRole::System,
                MessageRole::User => OllamaRole::User,
                MessageRole::Assistant => OllamaRole::Assistant,
            },
            content: msg.content.clone(),
            images: None,
        }
    }
}

#[async_trait]
impl Llm for OllamaLlm {
    #[cfg(feature = "ollama")]
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse> {
        let options = options.unwrap_or_default();

        let mut ollama_messages: Vec<ChatMessage> =
            messages.iter().map(Self::message_to_ollama).collect();

        // Ollama has no JSON mode flag on chat, so ask for it in the prompt.
        if options.json {
            if let Some(last) = ollama_messages.last_mut() {
                last.content.push_str("\n\nPlease respond with valid JSON only.");
            }
        }

        let request = ChatMessageRequest::new(self.config.model.clone(), ollama_messages).options(
            OllamaOptions::default()
                .temperature(options.temperature.unwrap_or(self.config.temperature)),
        );

        let response = self
            .client
            .send_chat_messages(request)
            .await
            .map_err(|e| StrataError::llm(format!("Ollama API error: {}", e)))?;

        Ok(LlmResponse {
            content: response.message.map(|m| m.content),
            usage: None,
        })
    }

    #[cfg(not(feature = "ollama"))]
    async fn generate(
        &self,
        _messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse> {
        Err(StrataError::Configuration(
            "Ollama feature not enabled. Enable the 'ollama' feature.".to_string(),
        ))
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_url() {
        let result = OllamaLlm::new(LlmConfig {
            base_url: Some("not a url".to_string()),
            ..Default::default()
        });
        assert!(matches!(result, Err(StrataError::Configuration(_))));
    }

    #[test]
    fn test_default_model() {
        let llm = OllamaLlm::new(LlmConfig::default()).unwrap();
        assert_eq!(llm.model_name(), DEFAULT_MODEL);
    }
}
