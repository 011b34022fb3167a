//! Configuration system for strata.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

use crate::controller::KeyStrategy;
use crate::error::{StrataError, StrataResult};
use crate::traits::{
    EmbedderConfig, EmbedderProvider, LlmConfig, LlmProvider, ShortTermProvider,
    ShortTermStoreConfig, VectorStoreConfig, VectorStoreProvider,
};

/// Placement, retrieval and consolidation tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierConfig {
    /// Lifetime given to a short-term item scored 0.
    pub min_ttl_secs: u64,
    /// Lifetime given to a short-term item scored just under the threshold.
    pub max_ttl_secs: u64,
    /// Scores at or above this go straight to long-term.
    pub importance_threshold: f64,
    /// Short-term items read at least this many times get promoted.
    pub access_threshold: u64,
    /// Interval between scheduled consolidation sweeps.
    pub sweep_interval_secs: u64,
    /// Long-term documents rescored per sweep.
    pub prune_page_size: usize,
    /// Matches requested from long-term search on a short-term miss.
    pub query_top_k: usize,
    /// Upper bound on any single oracle or store call.
    pub call_timeout_ms: u64,
    /// How short-term keys are derived from item text.
    pub key_strategy: KeyStrategy,
}

impl Default for TierConfig {
    fn default() -> Self {
        Self {
            min_ttl_secs: 10,
            max_ttl_secs: 60,
            importance_threshold: 70.0,
            access_threshold: 3,
            sweep_interval_secs: 300,
            prune_page_size: 100,
            query_top_k: 3,
            call_timeout_ms: 10_000,
            key_strategy: KeyStrategy::default(),
        }
    }
}

impl TierConfig {
    /// Check the tunables for internal consistency.
    pub fn validate(&self) -> StrataResult<()> {
        if self.min_ttl_secs == 0 {
            return Err(StrataError::Configuration(
                "min_ttl_secs must be at least 1".to_string(),
            ));
        }
        if self.min_ttl_secs > self.max_ttl_secs {
            return Err(StrataError::Configuration(format!(
                "min_ttl_secs ({}) exceeds max_ttl_secs ({})",
                self.min_ttl_secs, self.max_ttl_secs
            )));
        }
        if !self.importance_threshold.is_finite()
            || !(0.0..=100.0).contains(&self.importance_threshold)
        {
            return Err(StrataError::Configuration(format!(
                "importance_threshold must be within 0-100, got {}",
                self.importance_threshold
            )));
        }
        if self.access_threshold == 0 {
            return Err(StrataError::Configuration(
                "access_threshold must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(StrataError::Configuration(
                "sweep_interval_secs must be at least 1".to_string(),
            ));
        }
        if self.prune_page_size == 0 || self.query_top_k == 0 {
            return Err(StrataError::Configuration(
                "prune_page_size and query_top_k must be positive".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(StrataError::Configuration(
                "call_timeout_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }
}

/// LLM provider configuration with type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmProviderConfig {
    /// Provider type.
    pub provider: LlmProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: LlmConfig,
}

impl Default for LlmProviderConfig {
    fn default() -> Self {
        Self {
            provider: LlmProvider::OpenAI,
            config: LlmConfig {
                model: "gpt-4o-mini".to_string(),
                ..Default::default()
            },
        }
    }
}

/// Embedder provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmbedderProviderConfig {
    /// Provider type.
    pub provider: EmbedderProvider,
    /// Provider-specific configuration.
    #[serde(flatten)]
    pub config: EmbedderConfig,
}

/// Top-level strata configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StrataConfig {
    /// Placement and consolidation tunables.
    pub tiers: TierConfig,
    /// LLM backing the importance oracle.
    pub llm: LlmProviderConfig,
    /// Embedder backing long-term search.
    pub embedder: EmbedderProviderConfig,
    /// Short-term store.
    pub short_term: ShortTermStoreConfig,
    /// Long-term vector store.
    pub vector_store: VectorStoreConfig,
}

impl StrataConfig {
    /// Load configuration from a file (TOML, JSON, or YAML).
    pub fn from_file(path: impl AsRef<std::path::Path>) -> StrataResult<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let ext = path.as_ref().extension().and_then(|e| e.to_str());

        let config: Self = match ext {
            Some("toml") => {
                toml::from_str(&content).map_err(|e| StrataError::Configuration(e.to_string()))?
            }
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| StrataError::Configuration(e.to_string()))?,
            Some("yaml" | "yml") => serde_yaml::from_str(&content)
                .map_err(|e| StrataError::Configuration(e.to_string()))?,
            _ => {
                return Err(StrataError::Configuration(
                    "Unsupported config file format. Use .toml, .json, or .yaml".to_string(),
                ))
            }
        };
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from environment variables.
    ///
    /// Unparseable values are logged and the default is kept.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        let tiers = &mut config.tiers;
        env_parse("STRATA_MIN_TTL", &mut tiers.min_ttl_secs);
        env_parse("STRATA_MAX_TTL", &mut tiers.max_ttl_secs);
        env_parse("STRATA_IMPORTANCE_THRESHOLD", &mut tiers.importance_threshold);
        env_parse("STRATA_ACCESS_THRESHOLD", &mut tiers.access_threshold);
        env_parse("STRATA_SWEEP_INTERVAL_SECONDS", &mut tiers.sweep_interval_secs);
        env_parse("STRATA_PRUNE_PAGE_SIZE", &mut tiers.prune_page_size);
        env_parse("STRATA_QUERY_TOP_K", &mut tiers.query_top_k);
        env_parse("STRATA_CALL_TIMEOUT_MS", &mut tiers.call_timeout_ms);
        env_parse("STRATA_KEY_STRATEGY", &mut tiers.key_strategy);

        // LLM configuration
        if let Ok(provider) = std::env::var("STRATA_LLM_PROVIDER") {
            config.llm.provider = match provider.to_lowercase().as_str() {
                "ollama" => LlmProvider::Ollama,
                _ => LlmProvider::OpenAI,
            };
        }
        if let Ok(model) = std::env::var("STRATA_LLM_MODEL") {
            config.llm.config.model = model;
        }
        if let Ok(api_key) = std::env::var("OPENAI_API_KEY") {
            config.llm.config.api_key = Some(api_key.clone());
            config.embedder.config.api_key = Some(api_key);
        }

        // Embedder configuration
        if let Ok(provider) = std::env::var("STRATA_EMBEDDER_PROVIDER") {
            config.embedder.provider = match provider.to_lowercase().as_str() {
                "ollama" => EmbedderProvider::Ollama,
                _ => EmbedderProvider::OpenAI,
            };
        }
        if let Ok(model) = std::env::var("STRATA_EMBEDDER_MODEL") {
            config.embedder.config.model = model;
        }
        let mut dims = config.vector_store.embedding_model_dims;
        env_parse("STRATA_EMBEDDING_DIMS", &mut dims);
        config.vector_store.embedding_model_dims = dims;
        config.embedder.config.embedding_dims = dims;

        // Short-term store configuration
        if let Ok(provider) = std::env::var("STRATA_SHORT_TERM_PROVIDER") {
            config.short_term.provider = match provider.to_lowercase().as_str() {
                "memory" => ShortTermProvider::Memory,
                _ => ShortTermProvider::Redis,
            };
        }
        if let Ok(url) = std::env::var("STRATA_REDIS_URL") {
            config.short_term.url = url;
        }

        // Vector store configuration
        if let Ok(provider) = std::env::var("STRATA_VECTOR_STORE_PROVIDER") {
            config.vector_store.provider = match provider.to_lowercase().as_str() {
                "sqlite_vec" | "sqlite-vec" => VectorStoreProvider::SqliteVec,
                "memory" => VectorStoreProvider::Memory,
                _ => VectorStoreProvider::Milvus,
            };
        }
        if let Ok(url) = std::env::var("STRATA_VECTOR_STORE_URL") {
            config.vector_store.url = Some(url);
        }
        if let Ok(collection) = std::env::var("STRATA_COLLECTION") {
            config.vector_store.collection_name = collection;
        }
        if let Ok(path) = std::env::var("STRATA_SQLITE_PATH") {
            config.vector_store.path = Some(path);
        }

        config
    }

    /// Check the configuration for internal consistency.
    pub fn validate(&self) -> StrataResult<()> {
        self.tiers.validate()?;
        if self.embedder.config.embedding_dims != self.vector_store.embedding_model_dims {
            return Err(StrataError::Configuration(format!(
                "embedder dims ({}) do not match vector store dims ({})",
                self.embedder.config.embedding_dims, self.vector_store.embedding_model_dims
            )));
        }
        Ok(())
    }

    /// Build configuration using builder pattern.
    pub fn builder() -> StrataConfigBuilder {
        StrataConfigBuilder::default()
    }
}

fn env_parse<T: FromStr>(name: &str, target: &mut T) {
    if let Ok(raw) = std::env::var(name) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => tracing::warn!(var = name, value = %raw, "Ignoring unparseable setting"),
        }
    }
}

/// Builder for StrataConfig.
#[derive(Default)]
pub struct StrataConfigBuilder {
    config: StrataConfig,
}

impl StrataConfigBuilder {
    /// Set tier tunables.
    pub fn tiers(mut self, tiers: TierConfig) -> Self {
        self.config.tiers = tiers;
        self
    }

    /// Set LLM configuration.
    pub fn llm(mut self, config: LlmProviderConfig) -> Self {
        self.config.llm = config;
        self
    }

    /// Set embedder configuration.
    pub fn embedder(mut self, config: EmbedderProviderConfig) -> Self {
        self.config.embedder = config;
        self
    }

    /// Set short-term store configuration.
    pub fn short_term(mut self, config: ShortTermStoreConfig) -> Self {
        self.config.short_term = config;
        self
    }

    /// Set vector store configuration.
    pub fn vector_store(mut self, config: VectorStoreConfig) -> Self {
        self.config.vector_store = config;
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> StrataResult<StrataConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = StrataConfig::default();
        tokio_test::assert_ok!(config.validate());
        assert_eq!(config.tiers.min_ttl_secs, 10);
        assert_eq!(config.tiers.max_ttl_secs, 60);
        assert_eq!(config.tiers.importance_threshold, 70.0);
        assert_eq!(config.tiers.access_threshold, 3);
        assert_eq!(config.tiers.query_top_k, 3);
    }

    #[test]
    fn test_validate_rejects_inverted_ttl_bounds() {
        let tiers = TierConfig {
            min_ttl_secs: 90,
            max_ttl_secs: 60,
            ..Default::default()
        };
        assert!(matches!(
            tiers.validate(),
            Err(StrataError::Configuration(_))
        ));
    }

    #[test]
    fn test_validate_rejects_threshold_out_of_range() {
        let tiers = TierConfig {
            importance_threshold: 120.0,
            ..Default::default()
        };
        tokio_test::assert_err!(tiers.validate());

        let tiers = TierConfig {
            importance_threshold: f64::NAN,
            ..Default::default()
        };
        tokio_test::assert_err!(tiers.validate());
    }

    #[test]
    fn test_from_toml_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(
            file,
            r#"
[tiers]
min_ttl_secs = 5
max_ttl_secs = 30
key_strategy = "content_hash"

[short_term]
provider = "memory"
"#
        )
        .unwrap();

        let config = StrataConfig::from_file(file.path()).unwrap();
        assert_eq!(config.tiers.min_ttl_secs, 5);
        assert_eq!(config.tiers.max_ttl_secs, 30);
        assert_eq!(config.tiers.importance_threshold, 70.0);
        assert_eq!(config.tiers.key_strategy, KeyStrategy::ContentHash);
        assert_eq!(config.short_term.provider, ShortTermProvider::Memory);
    }

    #[test]
    fn test_from_file_rejects_unknown_extension() {
        let file = tempfile::Builder::new().suffix(".ini").tempfile().unwrap();
        assert!(matches!(
            StrataConfig::from_file(file.path()),
            Err(StrataError::Configuration(_))
        ));
    }

    #[test]
    fn test_builder_validates() {
        let result = StrataConfig::builder()
            .tiers(TierConfig {
                access_threshold: 0,
                ..Default::default()
            })
            .build();
        assert!(result.is_err());
    }
}
