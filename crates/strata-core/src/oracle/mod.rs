//! LLM-backed importance oracle.

mod parser;
mod prompts;

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{ErrorCode, StrataError, StrataResult};
use crate::traits::{GenerationOptions, ImportanceOracle, Llm};
use crate::types::Message;

pub use parser::{clean_response, parse_score};
pub use prompts::*;

/// Scores and summarizes text by prompting an [`Llm`].
pub struct LlmOracle {
    llm: Arc<dyn Llm>,
}

impl LlmOracle {
    pub fn new(llm: Arc<dyn Llm>) -> Self {
        Self { llm }
    }

    pub fn llm(&self) -> &Arc<dyn Llm> {
        &self.llm
    }
}

#[async_trait]
impl ImportanceOracle for LlmOracle {
    async fn score(&self, text: &str) -> StrataResult<f64> {
        let messages = vec![
            Message::system(SCORE_SYSTEM_PROMPT),
            Message::user(score_prompt(text)),
        ];
        let options = GenerationOptions {
            temperature: Some(0.0),
            max_tokens: Some(32),
            json: self.llm.supports_json_mode(),
        };

        let response = self
            .llm
            .generate(&messages, Some(options))
            .await
            .map_err(|e| e.into_scoring(ErrorCode::ScoreOracleFailed))?;

        let score = parse_score(response.content_or_empty())?;
        tracing::debug!(score, model = self.llm.model_name(), "Scored item");
        Ok(score)
    }

    async fn summarize(&self, text: &str) -> StrataResult<String> {
        let messages = vec![
            Message::system(SUMMARIZE_SYSTEM_PROMPT),
            Message::user(summarize_prompt(text)),
        ];
        let options = GenerationOptions {
            temperature: Some(0.0),
            ..Default::default()
        };

        let response = self
            .llm
            .generate(&messages, Some(options))
            .await
            .map_err(|e| e.into_scoring(ErrorCode::ScoreSummarizeFailed))?;

        let summary = clean_response(response.content_or_empty());
        if summary.is_empty() {
            return Err(StrataError::scoring_with_code(
                "oracle returned an empty summary",
                ErrorCode::ScoreSummarizeFailed,
            ));
        }
        Ok(summary)
    }
}
