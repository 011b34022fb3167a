//! strata-llm - LLM provider implementations for strata.
//!
//! The LLM backs the importance oracle (scoring and summarization) and the
//! server's pass-through generation endpoint.
//!
//! # Supported Providers
//!
//! - **OpenAI** (feature: `openai`) - GPT-4o, GPT-4, etc.
//! - **Ollama** (feature: `ollama`) - Local models via Ollama
//!
//! # Example
//!
//! ```ignore
//! use strata_core::LlmOracle;
//! use strata_llm::LlmFactory;
//!
//! let llm = LlmFactory::openai_with_model("gpt-4o-mini")?;
//! let oracle = LlmOracle::new(llm);
//! ```

mod factory;
mod ollama;
mod openai;

pub use factory::LlmFactory;
pub use ollama::OllamaLlm;
pub use openai::OpenAIProvider;

// Re-export core types for convenience
pub use strata_core::traits::{
    GenerationOptions, Llm, LlmConfig, LlmProvider, LlmResponse,
};
