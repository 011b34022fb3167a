//! Periodic scheduler for consolidation sweeps.
//!
//! Uses tokio-cron-scheduler to trigger [`TieredMemory::consolidate`] at a
//! fixed interval. Overlapping runs are never allowed: a trigger that fires
//! while a sweep is still running is dropped, not queued.

use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::Display;
use tokio::sync::{broadcast, watch};
use tokio_cron_scheduler::{Job, JobScheduler, JobSchedulerError};
use tracing::{debug, info};

use crate::controller::TieredMemory;
use crate::error::{StrataError, StrataResult};

use super::report::SweepReport;

const REPORT_CHANNEL_CAPACITY: usize = 16;

/// Lifecycle of the sweep loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum SweepState {
    Idle,
    Running,
    /// Shut down; further triggers are skipped.
    Stopped,
}

/// Outcome of asking for a sweep.
#[derive(Debug, Clone)]
pub enum SweepTrigger {
    Completed(SweepReport),
    /// Another sweep was in progress, or the scheduler is stopped.
    Skipped,
}

/// Idle/Running gate shared by the timer job and manual triggers.
struct SweepGate {
    state: watch::Sender<SweepState>,
}

impl SweepGate {
    fn new() -> Self {
        let (state, _) = watch::channel(SweepState::Idle);
        Self { state }
    }

    fn current(&self) -> SweepState {
        *self.state.borrow()
    }

    /// Move Idle -> Running. Returns a guard that moves back on drop.
    fn try_begin(self: &Arc<Self>) -> Option<SweepGuard> {
        let acquired = self.state.send_if_modified(|state| {
            if *state == SweepState::Idle {
                *state = SweepState::Running;
                true
            } else {
                false
            }
        });
        acquired.then(|| SweepGuard { gate: self.clone() })
    }

    /// Wait for any in-flight sweep, then move to Stopped.
    async fn stop(&self) {
        let mut rx = self.state.subscribe();
        loop {
            let stopped = self.state.send_if_modified(|state| match state {
                SweepState::Idle => {
                    *state = SweepState::Stopped;
                    true
                }
                _ => false,
            });
            if stopped || self.current() == SweepState::Stopped {
                return;
            }
            if rx.changed().await.is_err() {
                return;
            }
        }
    }
}

struct SweepGuard {
    gate: Arc<SweepGate>,
}

impl Drop for SweepGuard {
    fn drop(&mut self) {
        self.gate.state.send_replace(SweepState::Idle);
    }
}

/// Cloneable handle for triggering sweeps and observing their reports.
#[derive(Clone)]
pub struct SweepHandle {
    memory: Arc<TieredMemory>,
    gate: Arc<SweepGate>,
    reports: broadcast::Sender<SweepReport>,
}

impl SweepHandle {
    fn new(memory: Arc<TieredMemory>) -> Self {
        let (reports, _) = broadcast::channel(REPORT_CHANNEL_CAPACITY);
        Self {
            memory,
            gate: Arc::new(SweepGate::new()),
            reports,
        }
    }

    /// Current sweep state.
    pub fn state(&self) -> SweepState {
        self.gate.current()
    }

    /// Receive the report of every completed sweep.
    pub fn subscribe(&self) -> broadcast::Receiver<SweepReport> {
        self.reports.subscribe()
    }

    /// Run a sweep now unless one is already running.
    ///
    /// The sweep runs on its own task so dropping the returned future does
    /// not abandon it half way.
    pub async fn run_now(&self) -> StrataResult<SweepTrigger> {
        let handle = self.clone();
        tokio::spawn(async move { handle.trigger().await })
            .await
            .map_err(|e| StrataError::internal(format!("sweep task failed: {}", e)))
    }

    async fn trigger(&self) -> SweepTrigger {
        let Some(_guard) = self.gate.try_begin() else {
            debug!(state = %self.state(), "Sweep trigger skipped");
            return SweepTrigger::Skipped;
        };

        let report = self.memory.consolidate().await;
        // No subscribers is fine.
        let _ = self.reports.send(report.clone());
        SweepTrigger::Completed(report)
    }
}

/// Scheduler for periodic consolidation sweeps.
///
/// # Example
///
/// ```ignore
/// let memory = Arc::new(TieredMemory::new(config, oracle, short_term, long_term)?);
/// let mut scheduler = SweepScheduler::new(memory).await?;
/// scheduler.start().await?;
///
/// // ... on shutdown
/// scheduler.shutdown().await?;
/// ```
pub struct SweepScheduler {
    scheduler: JobScheduler,
    handle: SweepHandle,
    interval: Duration,
}

impl SweepScheduler {
    /// Create a scheduler using the controller's configured interval.
    ///
    /// Note: Call `start()` to begin periodic execution.
    pub async fn new(memory: Arc<TieredMemory>) -> Result<Self, JobSchedulerError> {
        let interval = memory.config().sweep_interval();
        Self::with_interval(memory, interval).await
    }

    /// Create a scheduler with an explicit interval.
    pub async fn with_interval(
        memory: Arc<TieredMemory>,
        interval: Duration,
    ) -> Result<Self, JobSchedulerError> {
        let scheduler = JobScheduler::new().await?;

        Ok(Self {
            scheduler,
            handle: SweepHandle::new(memory),
            interval: interval.max(Duration::from_secs(1)),
        })
    }

    /// Handle for manual triggers and report subscriptions.
    pub fn handle(&self) -> SweepHandle {
        self.handle.clone()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start the timer. The first sweep fires one interval from now.
    pub async fn start(&self) -> Result<(), JobSchedulerError> {
        let handle = self.handle.clone();

        let job = Job::new_repeated_async(self.interval, move |_uuid, _lock| {
            let handle = handle.clone();
            Box::pin(async move {
                debug!("Starting scheduled consolidation sweep");
                handle.trigger().await;
            })
        })?;

        self.scheduler.add(job).await?;
        self.scheduler.start().await?;

        info!(
            interval_secs = self.interval.as_secs(),
            "Consolidation scheduler started"
        );
        Ok(())
    }

    /// Stop the timer, then wait for an in-flight sweep to finish.
    pub async fn shutdown(&mut self) -> Result<(), JobSchedulerError> {
        info!("Shutting down consolidation scheduler");
        self.scheduler.shutdown().await?;
        self.handle.gate.stop().await;
        info!("Consolidation scheduler stopped");
        Ok(())
    }
}
