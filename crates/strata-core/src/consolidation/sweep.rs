//! Consolidation sweep: promotion of hot short-term items and pruning of
//! long-term documents that lost their importance.

use std::collections::HashSet;

use serde_json::json;

use crate::controller::TieredMemory;
use crate::error::{ErrorCode, StrataError, StrataResult, TimeoutKind};
use crate::types::{LongTermDocument, Metadata};

use super::report::{SweepPhase, SweepReport};

/// Metadata `source` value stamped on documents created by promotion.
pub const PROMOTION_SOURCE: &str = "promotion";

enum Promotion {
    /// Below the access threshold, or expired since enumeration.
    Skipped,
    /// Copied to long-term. The short-term delete may still have failed.
    Promoted {
        id: String,
        delete_error: Option<StrataError>,
    },
}

impl TieredMemory {
    /// Run one promotion phase followed by one pruning phase.
    ///
    /// Never fails as a whole. Per-item failures and phase enumeration
    /// failures are recorded in the returned report. With no intervening
    /// traffic and a deterministic oracle a second run reports no actions.
    pub async fn consolidate(&self) -> SweepReport {
        let mut report = SweepReport::new();

        let promoted = self.promote(&mut report).await;
        self.prune(&mut report, &promoted).await;

        let report = report.complete();
        tracing::info!(
            promoted = report.promoted,
            pruned = report.pruned,
            scanned_keys = report.scanned_keys,
            scanned_documents = report.scanned_documents,
            failures = report.failures.len(),
            duration_ms = report.duration_ms().unwrap_or(0),
            "Consolidation sweep complete"
        );
        report
    }

    /// Returns the ids of the long-term documents created by this phase.
    async fn promote(&self, report: &mut SweepReport) -> HashSet<String> {
        let mut promoted = HashSet::new();
        let keys = match self.short_term_call(self.short_term().keys()).await {
            Ok(keys) => keys,
            Err(e) => {
                report.record_phase_error(SweepPhase::Promotion, &e);
                return promoted;
            }
        };
        report.scanned_keys = keys.len();

        for key in keys {
            match self.promote_key(&key).await {
                Ok(Promotion::Skipped) => {}
                Ok(Promotion::Promoted { id, delete_error }) => {
                    report.promoted += 1;
                    tracing::debug!(id = %id, "Promoted short-term item");
                    if let Some(e) = delete_error {
                        report.record_failure(SweepPhase::Promotion, &key, &e);
                    }
                    promoted.insert(id);
                }
                Err(e) => report.record_failure(SweepPhase::Promotion, &key, &e),
            }
        }
        promoted
    }

    async fn promote_key(&self, key: &str) -> StrataResult<Promotion> {
        let access_count = self
            .short_term_call(self.short_term().get_access_count(key))
            .await?;
        if access_count < self.config().access_threshold {
            return Ok(Promotion::Skipped);
        }

        let Some(value) = self.short_term_call(self.short_term().get(key)).await? else {
            return Ok(Promotion::Skipped);
        };
        let text = self.config().key_strategy.text_for(key, &value);

        let summary = self
            .bounded(TimeoutKind::Oracle, self.oracle().summarize(text))
            .await
            .map_err(|e| e.into_scoring(ErrorCode::ScoreSummarizeFailed))?;
        if summary.trim().is_empty() {
            return Err(StrataError::scoring_with_code(
                "oracle returned an empty summary",
                ErrorCode::ScoreSummarizeFailed,
            ));
        }

        let mut metadata = Metadata::new();
        metadata.insert("source".to_string(), json!(PROMOTION_SOURCE));
        metadata.insert("access_count".to_string(), json!(access_count));

        let id = self
            .long_term_call(self.long_term().insert(summary.trim(), metadata))
            .await?;

        // Insert happened first, so a failed delete leaves a duplicate at worst.
        let delete_error = self
            .short_term_call(self.short_term().delete(key))
            .await
            .err();

        Ok(Promotion::Promoted { id, delete_error })
    }

    /// Rescore every long-term document, one page at a time.
    ///
    /// Documents promoted earlier in the same sweep are left alone. Pruned
    /// documents shift later ones down, so the offset only advances past
    /// documents that are still stored.
    async fn prune(&self, report: &mut SweepReport, promoted: &HashSet<String>) {
        let page_size = self.config().prune_page_size;
        let mut seen = HashSet::new();
        let mut offset = 0;

        loop {
            let page = match self
                .long_term_call(self.long_term().enumerate(offset, page_size))
                .await
            {
                Ok(page) => page,
                Err(e) => {
                    report.record_phase_error(SweepPhase::Pruning, &e);
                    return;
                }
            };
            let last_page = page.len() < page_size;
            let mut kept = 0;
            let mut progressed = false;

            for document in page {
                // Stores that ignore the offset hand back pages already seen.
                if !seen.insert(document.id.clone()) {
                    kept += 1;
                    continue;
                }
                progressed = true;
                if promoted.contains(&document.id) {
                    kept += 1;
                    continue;
                }

                report.scanned_documents += 1;
                match self.prune_document(&document).await {
                    Ok(true) => report.pruned += 1,
                    Ok(false) => kept += 1,
                    Err(e) => {
                        kept += 1;
                        report.record_failure(SweepPhase::Pruning, &document.id, &e);
                    }
                }
            }

            if last_page || !progressed {
                return;
            }
            offset += kept;
        }
    }

    async fn prune_document(&self, document: &LongTermDocument) -> StrataResult<bool> {
        let score = self.score(&document.text).await?;
        if score >= self.config().importance_threshold {
            return Ok(false);
        }

        self.long_term_call(self.long_term().delete_by_id(&document.id))
            .await?;
        tracing::debug!(id = %document.id, score, "Pruned long-term document");
        Ok(true)
    }
}
