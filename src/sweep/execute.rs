//! Sweep execution - effectful operations
//!
//! This module takes a `DeletionPlan` (created by the pure planning
//! functions) and performs the deletions. Every action is attempted on its
//! own: a failure is recorded and the next action still runs.

use crate::deadline::bounded;
use crate::git::LocalRepository;
use crate::platform::PlatformService;
use crate::sweep::ProgressCallback;
use crate::sweep::plan::DeletionPlan;
use crate::sweep::report::{ReportEntry, RunReport};
use crate::types::{DeletionAction, Outcome, Target};
use chrono::Utc;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{info, warn};

/// Options for plan execution
#[derive(Debug, Clone)]
pub struct ExecuteOptions {
    /// Base branch; a deletion naming it is refused
    pub base_branch: String,
    /// Remote deletions in flight at once
    pub concurrency: usize,
    /// Budget per deletion
    pub timeout: Duration,
}

struct Collaborators<'a> {
    platform: &'a dyn PlatformService,
    local: &'a dyn LocalRepository,
    options: &'a ExecuteOptions,
    interrupt: &'a AtomicBool,
}

/// Execute the deletion plan (EFFECTFUL)
///
/// Remote deletions run first, up to `concurrency` at a time. Local
/// deletions follow one by one, since git serializes ref updates through
/// lock files. Skips are recorded as `NotAttempted`. Once `interrupt` is set
/// no further deletion is issued; those already issued are not rolled back.
///
/// The report lists every action in plan order regardless of the order in
/// which deletions completed.
pub async fn execute_plan(
    plan: &DeletionPlan,
    platform: &dyn PlatformService,
    local: &dyn LocalRepository,
    options: &ExecuteOptions,
    progress: &dyn ProgressCallback,
    interrupt: &AtomicBool,
) -> RunReport {
    let started_at = Utc::now();
    let ctx = Collaborators {
        platform,
        local,
        options,
        interrupt,
    };
    let mut outcomes: Vec<Option<Outcome>> = vec![None; plan.actions.len()];

    let deletes_for = |target: Target| {
        plan.actions
            .iter()
            .enumerate()
            .filter(move |(_, a)| a.is_delete() && a.target == target)
    };

    let remote_results: Vec<(usize, Outcome)> = stream::iter(deletes_for(Target::Remote))
        .map(|(index, action)| {
            let ctx = &ctx;
            async move {
                let outcome = apply(action, ctx).await;
                progress.on_outcome(action, &outcome).await;
                (index, outcome)
            }
        })
        .buffer_unordered(options.concurrency.max(1))
        .collect()
        .await;

    for (index, outcome) in remote_results {
        outcomes[index] = Some(outcome);
    }

    for (index, action) in deletes_for(Target::Local) {
        let outcome = apply(action, &ctx).await;
        progress.on_outcome(action, &outcome).await;
        outcomes[index] = Some(outcome);
    }

    let entries: Vec<ReportEntry> = plan
        .actions
        .iter()
        .zip(outcomes)
        .map(|(action, outcome)| ReportEntry {
            action: action.clone(),
            outcome: outcome.unwrap_or(Outcome::NotAttempted),
        })
        .collect();

    let report = RunReport {
        entries,
        started_at,
        finished_at: Utc::now(),
        interrupted: interrupt.load(Ordering::SeqCst),
    };

    let summary = report.summary();
    info!(
        remote_deleted = summary.remote.deleted,
        remote_failed = summary.remote.failed,
        local_deleted = summary.local.deleted,
        local_failed = summary.local.failed,
        interrupted = report.interrupted,
        "execution finished"
    );
    report
}

async fn apply(action: &DeletionAction, ctx: &Collaborators<'_>) -> Outcome {
    if ctx.interrupt.load(Ordering::SeqCst) {
        return Outcome::NotAttempted;
    }
    if action.branch == ctx.options.base_branch {
        warn!(branch = %action.branch, "refusing to delete the base branch");
        return Outcome::Failed("refusing to delete the base branch".to_string());
    }

    let operation = format!("delete {} branch {}", action.target, action.branch);
    let result = match action.target {
        Target::Remote => {
            bounded(
                operation,
                ctx.options.timeout,
                ctx.platform.delete_branch(&action.branch),
            )
            .await
        }
        Target::Local => {
            bounded(
                operation,
                ctx.options.timeout,
                ctx.local.delete_branch(&action.branch),
            )
            .await
        }
    };

    match result {
        Ok(()) => {
            info!(branch = %action.branch, target = %action.target, "deleted");
            Outcome::Succeeded
        }
        Err(e) => {
            warn!(branch = %action.branch, target = %action.target, error = %e, "deletion failed");
            Outcome::Failed(e.to_string())
        }
    }
}
