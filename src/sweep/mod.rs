//! Sweep engine for merged branches
//!
//! Three-phase pattern:
//! 1. Gather - sync, list both branch universes, query merge status (effectful, bounded)
//! 2. Plan - create `DeletionPlan` (pure, testable)
//! 3. Execute - perform deletions (effectful)

mod execute;
mod gather;
mod plan;
mod report;

pub use execute::{ExecuteOptions, execute_plan};
pub use gather::{GatherOptions, Snapshot, gather};
pub use plan::{
    DEFAULT_KEEP, DeletionPlan, PlanOptions, create_deletion_plan, merge_candidates, reconcile,
};
pub use report::{ReportEntry, RunReport, Summary, TargetSummary};

use crate::types::{DeletionAction, Outcome};
use async_trait::async_trait;

/// Progress callback for status updates during gather and execution
#[async_trait]
pub trait ProgressCallback: Send + Sync {
    /// A phase started or made progress
    async fn on_message(&self, message: &str);

    /// A deletion finished (or was refused)
    async fn on_outcome(&self, action: &DeletionAction, outcome: &Outcome);
}

/// Progress callback that ignores everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

#[async_trait]
impl ProgressCallback for NoopProgress {
    async fn on_message(&self, _message: &str) {}

    async fn on_outcome(&self, _action: &DeletionAction, _outcome: &Outcome) {}
}
