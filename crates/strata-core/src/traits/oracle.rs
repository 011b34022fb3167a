//! Importance oracle trait.

use async_trait::async_trait;

use crate::error::StrataResult;

/// Rates how important a piece of text is and condenses it for archival.
///
/// Implementations return scores on a 0-100 scale. The controller re-checks
/// the range and treats anything else as a scoring failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImportanceOracle: Send + Sync {
    /// Score `text` on a 0-100 importance scale.
    async fn score(&self, text: &str) -> StrataResult<f64>;

    /// Produce a condensed representation of `text`.
    async fn summarize(&self, text: &str) -> StrataResult<String>;
}
