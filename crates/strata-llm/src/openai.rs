//! OpenAI LLM provider implementation.

use async_trait::async_trait;

use strata_core::error::{StrataError, StrataResult};
use strata_core::traits::{GenerationOptions, Llm, LlmConfig, LlmResponse};
use strata_core::types::Message;

#[cfg(feature = "openai")]
use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestAssistantMessage, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessage, ChatCompletionRequestUserMessage,
        CreateChatCompletionRequest, ResponseFormat as OpenAIResponseFormat,
    },
    Client,
};
#[cfg(feature = "openai")]
use backon::{ExponentialBuilder, Retryable};
#[cfg(feature = "openai")]
use strata_core::traits::TokenUsage;

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI LLM provider.
pub struct OpenAIProvider {
    #[cfg(feature = "openai")]
    client: Client<OpenAIConfig>,
    config: LlmConfig,
}

impl OpenAIProvider {
    /// Create a new OpenAI LLM provider.
    pub fn new(config: LlmConfig) -> StrataResult<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                StrataError::Configuration("OpenAI API key not found. Set OPENAI_API_KEY environment variable or provide api_key in config.".to_string())
            })?;

        #[cfg(feature = "openai")]
        let openai_config = match config.base_url {
            Some(ref base_url) => OpenAIConfig::new()
                .with_api_key(api_key)
                .with_api_base(base_url),
            None => OpenAIConfig::new().with_api_key(api_key),
        };
        #[cfg(not(feature = "openai"))]
        let _ = api_key;

        #[cfg(feature = "openai")]
        let client = Client::with_config(openai_config);

        let mut config = config;
        if config.model.is_empty() {
            config.model = DEFAULT_MODEL.to_string();
        }

        Ok(Self {
            #[cfg(feature = "openai")]
            client,
            config,
        })
    }

    #[cfg(feature = "openai")]
    fn message_to_openai(msg: &Message) -> ChatCompletionRequestMessage {
        use strata_core::types::MessageRole;

        match msg.role {
            MessageRole::System => {
                ChatCompletionRequestMessage::System(ChatCompletionRequestSystemMessage {
                    content: async_openai::types::ChatCompletionRequestSystemMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            MessageRole::User => {
                ChatCompletionRequestMessage::User(ChatCompletionRequestUserMessage {
                    content: async_openai::types::ChatCompletionRequestUserMessageContent::Text(
                        msg.content.clone(),
                    ),
                    name: None,
                })
            }
            MessageRole::Assistant => {
                ChatCompletionRequestMessage::Assistant(ChatCompletionRequestAssistantMessage {
                    content: Some(
                        async_openai::types::ChatCompletionRequestAssistantMessageContent::Text(
                            msg.content.clone(),
                        ),
                    ),
                    ..Default::default()
                })
            }
        }
    }
}

/// Network failures are worth another attempt. API errors are not.
#[cfg(feature = "openai")]
fn is_transient(error: &OpenAIError) -> bool {
    matches!(error, OpenAIError::Reqwest(_))
}

#[async_trait]
impl Llm for OpenAIProvider {
    #[cfg(feature = "openai")]
    async fn generate(
        &self,
        messages: &[Message],
        options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse> {
        let options = options.unwrap_or_default();

        let request = CreateChatCompletionRequest {
            model: self.config.model.clone(),
            messages: messages.iter().map(Self::message_to_openai).collect(),
            temperature: Some(options.temperature.unwrap_or(self.config.temperature)),
            max_tokens: Some(options.max_tokens.unwrap_or(self.config.max_tokens)),
            response_format: options.json.then_some(OpenAIResponseFormat::JsonObject),
            ..Default::default()
        };

        let request = &request;
        let create = || async move { self.client.chat().create(request.clone()).await };
        let response = create
            .retry(ExponentialBuilder::default().with_max_times(self.config.max_retries))
            .when(is_transient)
            .notify(|err, dur| {
                tracing::warn!("OpenAI request failed, retrying in {:?}: {}", dur, err);
            })
            .await
            .map_err(|e| StrataError::llm(format!("OpenAI API error: {}", e)))?;

        let choice = response
            .choices
            .first()
            .ok_or_else(|| StrataError::llm("No response choices returned"))?;

        let usage = response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        });

        Ok(LlmResponse {
            content: choice.message.content.clone(),
            usage,
        })
    }

    #[cfg(not(feature = "openai"))]
    async fn generate(
        &self,
        _messages: &[Message],
        _options: Option<GenerationOptions>,
    ) -> StrataResult<LlmResponse> {
        Err(StrataError::Configuration(
            "OpenAI feature not enabled. Enable the 'openai' feature.".to_string(),
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
    fn test_explicit_key_and_default_model() {
        let provider = OpenAIProvider::new(LlmConfig {
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(provider.model_name(), DEFAULT_MODEL);
    }

    #[test]
    fn test_configured_model_is_kept() {
        let provider = OpenAIProvider::new(LlmConfig {
            model: "gpt-4".to_string(),
            api_key: Some("sk-test".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(provider.model_name(), "gpt-4");
    }
}
