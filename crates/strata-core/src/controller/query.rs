//! Query resolution across tiers, plus short-term inspection.

use crate::error::{StrataError, StrataResult, TimeoutKind};
use crate::types::{QueryResult, ShortTermEntry};

use super::TieredMemory;

impl TieredMemory {
    /// Resolve `text` against short-term first, then long-term.
    ///
    /// A short-term hit bumps the key's access count. A failed bump is
    /// logged and otherwise ignored since it only delays promotion.
    pub async fn query(&self, text: &str) -> StrataResult<QueryResult> {
        self.query_with_top_k(text, self.config.query_top_k).await
    }

    /// Like [`query`](Self::query) with an explicit long-term result count.
    pub async fn query_with_top_k(&self, text: &str, top_k: usize) -> StrataResult<QueryResult> {
        if text.trim().is_empty() {
            return Err(StrataError::validation("query must not be empty"));
        }
        let top_k = top_k.max(1);

        let key = self.config.key_strategy.key_for(text);
        let hit = self.short_term_call(self.short_term().get(&key)).await?;

        if let Some(value) = hit {
            match self
                .short_term_call(self.short_term().incr_access_count(&key, 1))
                .await
            {
                Ok(count) => tracing::debug!(access_count = count, "Short-term hit"),
                Err(e) => tracing::warn!("Failed to record short-term access: {}", e),
            }
            return Ok(QueryResult::ShortTerm { result: value });
        }

        let results = self
            .bounded(TimeoutKind::Search, self.long_term().search(text, top_k, None))
            .await
            .map_err(StrataError::into_retrieval)?;

        match results.first() {
            Some(top) => {
                let used_data = top.text.clone();
                tracing::debug!(matches = results.len(), "Long-term hit");
                Ok(QueryResult::LongTerm { results, used_data })
            }
            None => {
                tracing::debug!("No match in either tier");
                Ok(QueryResult::None)
            }
        }
    }

    /// Current short-term state for `text`, or `None` if it is not live.
    ///
    /// Read-only: does not count as an access.
    pub async fn inspect(&self, text: &str) -> StrataResult<Option<ShortTermEntry>> {
        let key = self.config.key_strategy.key_for(text);

        let ttl = self.short_term_call(self.short_term().ttl(&key)).await?;
        if ttl.is_none() {
            return Ok(None);
        }
        let access_count = self
            .short_term_call(self.short_term().get_access_count(&key))
            .await?;

        Ok(Some(ShortTermEntry::new(key, ttl, access_count)))
    }
}
