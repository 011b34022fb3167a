//! Consolidation: the background sweep that promotes frequently read
//! short-term items into long-term storage and prunes long-term documents
//! whose importance has dropped below the threshold.
//!
//! Both phases tolerate a crash between steps. Promotion inserts before it
//! deletes, so the worst case is a duplicate long-term document, never a
//! lost item.

mod report;
mod scheduler;
mod sweep;

pub use report::{PhaseError, SweepFailure, SweepPhase, SweepReport};
pub use scheduler::{SweepHandle, SweepScheduler, SweepState, SweepTrigger};
pub use sweep::PROMOTION_SOURCE;
