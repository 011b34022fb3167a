//! Wiring of the controller, its stores and the sweep scheduler from
//! configuration.

use std::sync::Arc;

use strata_core::config::StrataConfig;
use strata_core::error::{StrataError, StrataResult};
use strata_core::{LlmOracle, SweepScheduler, TieredMemory};
use strata_llm::LlmFactory;
use strata_stores::StoreFactory;

use crate::state::AppState;

/// Everything the server runs: request state plus the scheduler that owns
/// the periodic sweep.
pub struct Runtime {
    pub state: AppState,
    pub scheduler: SweepScheduler,
}

/// Build the controller and scheduler from configuration.
///
/// The scheduler is created but not started.
pub async fn create_runtime(config: StrataConfig) -> StrataResult<Runtime> {
    config.validate()?;

    let llm = LlmFactory::from_config(&config.llm)?;
    let oracle = Arc::new(LlmOracle::new(llm.clone()));

    let short_term = StoreFactory::short_term(&config.short_term).await?;
    let long_term = StoreFactory::long_term(&config).await?;

    let memory = Arc::new(TieredMemory::new(
        config.tiers.clone(),
        oracle,
        short_term,
        long_term,
    )?);

    let scheduler = SweepScheduler::new(memory.clone())
        .await
        .map_err(|e| StrataError::internal(format!("Failed to create sweep scheduler: {}", e)))?;

    let state = AppState::new(memory, llm, scheduler.handle(), config);
    Ok(Runtime { state, scheduler })
}
