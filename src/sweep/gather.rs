//! Sweep gathering - collect every input the planner needs

use crate::deadline::bounded;
use crate::error::Result;
use crate::git::LocalRepository;
use crate::oracle::{MergeOracle, MergeStatusMap};
use crate::platform::PlatformService;
use crate::sweep::ProgressCallback;
use crate::sweep::plan::{DeletionPlan, PlanOptions, create_deletion_plan, merge_candidates};
use crate::types::{LocalBranch, RemoteBranch};
use std::time::Duration;
use tracing::{debug, info};

/// Options for the gather phase
#[derive(Debug, Clone)]
pub struct GatherOptions {
    /// Remote to sync and read tracking refs from
    pub remote_name: String,
    /// Branch merge status is checked against
    pub base_branch: String,
    /// Merge queries in flight at once
    pub concurrency: usize,
    /// Budget per external call
    pub timeout: Duration,
}

/// Everything observed about the branch universe at one moment
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Branches on the host
    pub remote: Vec<RemoteBranch>,
    /// Local branches
    pub local: Vec<LocalBranch>,
    /// Remote-tracking names after prune
    pub tracking: Vec<String>,
    /// Merge status of each candidate
    pub statuses: MergeStatusMap,
}

impl Snapshot {
    /// Plan deletions from this snapshot
    #[must_use]
    pub fn plan(&self, options: &PlanOptions) -> DeletionPlan {
        create_deletion_plan(
            &self.remote,
            &self.local,
            &self.tracking,
            &self.statuses,
            options,
        )
    }
}

/// Gather the snapshot (EFFECTFUL)
///
/// The local clone is synced first so pruned tracking refs are visible to
/// orphan detection. A failed listing aborts the run; a failed merge query
/// only makes that branch `Unknown`.
pub async fn gather(
    platform: &dyn PlatformService,
    local: &dyn LocalRepository,
    options: &GatherOptions,
    progress: &dyn ProgressCallback,
) -> Result<Snapshot> {
    let remote_name = options.remote_name.as_str();

    progress
        .on_message(&format!("Syncing with {remote_name}"))
        .await;
    bounded(
        format!("sync with {remote_name}"),
        options.timeout,
        local.sync_with_remote(remote_name),
    )
    .await?;

    progress.on_message("Listing remote branches").await;
    let remote = bounded(
        "list remote branches",
        options.timeout,
        platform.list_branches(),
    )
    .await?;

    progress.on_message("Listing local branches").await;
    let local_branches = bounded(
        "list local branches",
        options.timeout,
        local.list_local_branches(),
    )
    .await?;
    let tracking = bounded(
        "list remote-tracking branches",
        options.timeout,
        local.list_remote_tracking(remote_name),
    )
    .await?;
    debug!(
        remote = remote.len(),
        local = local_branches.len(),
        tracking = tracking.len(),
        "listed branches"
    );

    let candidates = merge_candidates(&remote, &options.base_branch);
    progress
        .on_message(&format!(
            "Checking merge status of {} branch(es)",
            candidates.len()
        ))
        .await;
    let oracle = MergeOracle::new(platform, options.concurrency, options.timeout);
    let statuses = oracle.statuses(candidates, &options.base_branch).await;
    info!(
        candidates = statuses.len(),
        base = %options.base_branch,
        "merge status gathered"
    );

    Ok(Snapshot {
        remote,
        local: local_branches,
        tracking,
        statuses,
    })
}
