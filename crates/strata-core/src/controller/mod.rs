//! Tiered memory controller - placement, query resolution and inspection.

mod identity;
mod ingest;
mod query;
mod ttl;

use std::future::Future;
use std::sync::Arc;

use crate::config::TierConfig;
use crate::error::{ErrorCode, StoreKind, StrataError, StrataResult, TimeoutKind};
use crate::traits::{ImportanceOracle, LongTermStore, ShortTermStore};

pub use identity::{KeyStrategy, RAW_TEXT_MARKER};
pub use ttl::TtlPolicy;

/// Routes items between an expiring short-term store and a durable
/// long-term store based on oracle-assigned importance.
///
/// Holds no mutable state of its own; all shared state lives in the stores.
/// Every oracle and store call is bounded by `call_timeout_ms`.
pub struct TieredMemory {
    config: TierConfig,
    ttl_policy: TtlPolicy,
    oracle: Arc<dyn ImportanceOracle>,
    short_term: Arc<dyn ShortTermStore>,
    long_term: Arc<dyn LongTermStore>,
}

impl TieredMemory {
    /// Create a controller over the given collaborators.
    ///
    /// Fails with a configuration error if `config` is inconsistent.
    pub fn new(
        config: TierConfig,
        oracle: Arc<dyn ImportanceOracle>,
        short_term: Arc<dyn ShortTermStore>,
        long_term: Arc<dyn LongTermStore>,
    ) -> StrataResult<Self> {
        config.validate()?;
        let ttl_policy = TtlPolicy::from(&config);

        Ok(Self {
            config,
            ttl_policy,
            oracle,
            short_term,
            long_term,
        })
    }

    pub fn config(&self) -> &TierConfig {
        &self.config
    }

    pub fn ttl_policy(&self) -> TtlPolicy {
        self.ttl_policy
    }

    pub(crate) fn oracle(&self) -> &dyn ImportanceOracle {
        self.oracle.as_ref()
    }

    pub(crate) fn short_term(&self) -> &dyn ShortTermStore {
        self.short_term.as_ref()
    }

    pub(crate) fn long_term(&self) -> &dyn LongTermStore {
        self.long_term.as_ref()
    }

    /// Await `fut` under the configured call timeout.
    pub(crate) async fn bounded<T, F>(&self, kind: TimeoutKind, fut: F) -> StrataResult<T>
    where
        F: Future<Output = StrataResult<T>>,
    {
        let limit = self.config.call_timeout();
        match tokio::time::timeout(limit, fut).await {
            Ok(result) => result,
            Err(_) => Err(StrataError::timeout(kind, limit)),
        }
    }

    /// Score `text` and reject anything outside `[0, 100]`.
    pub(crate) async fn score(&self, text: &str) -> StrataResult<f64> {
        let score = self
            .bounded(TimeoutKind::Oracle, self.oracle.score(text))
            .await
            .map_err(|e| e.into_scoring(ErrorCode::ScoreOracleFailed))?;
        validate_score(score)
    }

    pub(crate) async fn short_term_call<T, F>(&self, fut: F) -> StrataResult<T>
    where
        F: Future<Output = StrataResult<T>>,
    {
        self.bounded(TimeoutKind::Store(StoreKind::ShortTerm), fut)
            .await
            .map_err(|e| e.into_store(StoreKind::ShortTerm))
    }

    pub(crate) async fn long_term_call<T, F>(&self, fut: F) -> StrataResult<T>
    where
        F: Future<Output = StrataResult<T>>,
    {
        self.bounded(TimeoutKind::Store(StoreKind::LongTerm), fut)
            .await
            .map_err(|e| e.into_store(StoreKind::LongTerm))
    }
}

/// Accept only finite scores within the 0-100 scale.
pub fn validate_score(score: f64) -> StrataResult<f64> {
    if !score.is_finite() {
        return Err(StrataError::scoring_with_code(
            format!("oracle returned non-finite score {score}"),
            ErrorCode::ScoreInvalidOutput,
        ));
    }
    if !(0.0..=100.0).contains(&score) {
        return Err(StrataError::scoring_with_code(
            format!("oracle score {score} is outside 0-100"),
            ErrorCode::ScoreOutOfRange,
        ));
    }
    Ok(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_score_bounds() {
        assert_eq!(validate_score(0.0).unwrap(), 0.0);
        assert_eq!(validate_score(100.0).unwrap(), 100.0);
        assert_eq!(
            validate_score(100.5).unwrap_err().code(),
            ErrorCode::ScoreOutOfRange
        );
        assert_eq!(
            validate_score(-1.0).unwrap_err().code(),
            ErrorCode::ScoreOutOfRange
        );
        assert_eq!(
            validate_score(f64::NAN).unwrap_err().code(),
            ErrorCode::ScoreInvalidOutput
        );
    }
}
