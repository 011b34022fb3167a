//! Sweep outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::error::StrataError;

/// The two phases of a consolidation sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SweepPhase {
    /// Frequently read short-term items move to long-term.
    Promotion,
    /// Long-term documents that no longer score high enough are removed.
    Pruning,
}

/// One item that failed within a phase. The phase carried on past it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub phase: SweepPhase,
    /// Short-term key or long-term document id.
    pub target: String,
    pub code: String,
    pub message: String,
}

impl SweepFailure {
    pub fn new(phase: SweepPhase, target: impl Into<String>, error: &StrataError) -> Self {
        Self {
            phase,
            target: target.into(),
            code: error.code().as_str().to_string(),
            message: error.to_string(),
        }
    }
}

/// A phase that could not enumerate its inputs and was skipped this cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseError {
    pub phase: SweepPhase,
    pub code: String,
    pub message: String,
}

/// Result of one consolidation sweep.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SweepReport {
    /// Short-term keys copied into long-term.
    pub promoted: usize,
    /// Long-term documents deleted.
    pub pruned: usize,
    /// Live short-term keys examined.
    pub scanned_keys: usize,
    /// Long-term documents rescored.
    pub scanned_documents: usize,
    /// Per-item failures (non-fatal, processing continued).
    pub failures: Vec<SweepFailure>,
    /// Phases aborted because enumeration failed.
    pub phase_errors: Vec<PhaseError>,
    /// Timestamp when the sweep started.
    pub started_at: DateTime<Utc>,
    /// Timestamp when the sweep completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl SweepReport {
    /// Create a new report with start timestamp.
    pub fn new() -> Self {
        Self {
            started_at: Utc::now(),
            ..Default::default()
        }
    }

    /// Mark the report as complete.
    pub fn complete(mut self) -> Self {
        self.completed_at = Some(Utc::now());
        self
    }

    /// True when the sweep changed nothing in either store.
    pub fn is_noop(&self) -> bool {
        self.promoted == 0 && self.pruned == 0
    }

    /// True when every item and both enumerations succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.phase_errors.is_empty()
    }

    /// Duration of the sweep.
    pub fn duration_ms(&self) -> Option<i64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds())
    }

    pub(crate) fn record_failure(
        &mut self,
        phase: SweepPhase,
        target: impl Into<String>,
        error: &StrataError,
    ) {
        let failure = SweepFailure::new(phase, target, error);
        tracing::warn!(
            phase = %failure.phase,
            target = %failure.target,
            code = %failure.code,
            "Sweep item failed: {}",
            failure.message
        );
        self.failures.push(failure);
    }

    pub(crate) fn record_phase_error(&mut self, phase: SweepPhase, error: &StrataError) {
        tracing::error!(phase = %phase, error = %error, "Sweep phase aborted");
        self.phase_errors.push(PhaseError {
            phase,
            code: error.code().as_str().to_string(),
            message: error.to_string(),
        });
    }
}
