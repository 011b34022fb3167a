//! Ingest: score an item and place it in exactly one tier.

use crate::error::{StrataError, StrataResult};
use crate::types::{Metadata, PlacementResult};

use super::TieredMemory;

impl TieredMemory {
    /// Score `text` and write it to the tier its importance calls for.
    ///
    /// Below the importance threshold the item goes to short-term with a
    /// lifetime proportional to its score. At or above the threshold it is
    /// inserted into long-term with empty metadata. A scoring failure aborts
    /// before any store is touched.
    pub async fn ingest(&self, text: &str) -> StrataResult<PlacementResult> {
        if text.trim().is_empty() {
            return Err(StrataError::validation("text must not be empty"));
        }

        let importance_score = self.score(text).await?;

        if importance_score < self.config.importance_threshold {
            let ttl_seconds = self.ttl_policy.ttl_secs(importance_score);
            let strategy = self.config.key_strategy;
            let key = strategy.key_for(text);

            self.short_term_call(self.short_term().set(
                &key,
                strategy.value_for(text),
                std::time::Duration::from_secs(ttl_seconds),
            ))
            .await?;

            tracing::debug!(
                score = importance_score,
                ttl_seconds,
                "Placed item in short-term memory"
            );
            Ok(PlacementResult::ShortTerm {
                ttl_seconds,
                importance_score,
            })
        } else {
            let id = self
                .long_term_call(self.long_term().insert(text, Metadata::new()))
                .await?;

            tracing::debug!(score = importance_score, id = %id, "Placed item in long-term memory");
            Ok(PlacementResult::LongTerm {
                id,
                importance_score,
            })
        }
    }
}
