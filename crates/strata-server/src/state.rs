//! Server state management.

use std::sync::Arc;

use strata_core::config::StrataConfig;
use strata_core::traits::Llm;
use strata_core::{SweepHandle, TieredMemory};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub memory: Arc<TieredMemory>,
    /// Model used by `/generate`, shared with the importance oracle.
    pub llm: Arc<dyn Llm>,
    pub sweeps: SweepHandle,
    pub config: Arc<StrataConfig>,
}

impl AppState {
    pub fn new(
        memory: Arc<TieredMemory>,
        llm: Arc<dyn Llm>,
        sweeps: SweepHandle,
        config: StrataConfig,
    ) -> Self {
        Self {
            memory,
            llm,
            sweeps,
            config: Arc::new(config),
        }
    }

    /// Configuration with credentials removed, safe to return to clients.
    pub fn redacted_config(&self) -> StrataConfig {
        let mut config = (*self.config).clone();
        config.llm.config.api_key = None;
        config.embedder.config.api_key = None;
        config
    }
}
