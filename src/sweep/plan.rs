//! Sweep planning - pure functions for creating deletion plans
//!
//! This module contains the pure, testable logic for deciding what to
//! delete. No I/O happens here - all data is passed in, making it easy to
//! unit test.

use crate::oracle::MergeStatusMap;
use crate::types::{
    Branch, BranchOrigin, DeletionAction, LocalBranch, MergeStatus, Reason, RemoteBranch, Target,
};
use std::collections::{HashMap, HashSet};

/// Local branch names never treated as orphans, whatever else is kept
pub const DEFAULT_KEEP: [&str; 2] = ["main", "master"];

/// Options for sweep planning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanOptions {
    /// The protected integration branch; never deleted
    pub base_branch: String,
    /// Local names excluded from orphan cleanup in addition to [`DEFAULT_KEEP`]
    pub keep: Vec<String>,
    /// Emit remote deletions
    pub delete_remote: bool,
    /// Emit local deletions
    pub delete_local: bool,
}

impl PlanOptions {
    /// Options for `base_branch` with no extra kept names, both targets enabled
    pub fn new(base_branch: impl Into<String>) -> Self {
        Self {
            base_branch: base_branch.into(),
            keep: Vec::new(),
            delete_remote: true,
            delete_local: true,
        }
    }

    /// Whether `name` is never removed as an orphan
    pub fn is_kept(&self, name: &str) -> bool {
        DEFAULT_KEEP.contains(&name) || self.keep.iter().any(|k| k == name)
    }
}

/// Deletion plan - the functional core output
///
/// Created by [`create_deletion_plan`] (pure) and applied by
/// [`execute_plan`](super::execute_plan) (effectful). Actions are in
/// canonical order: remote deletions, their paired local deletions, orphan
/// deletions, then skips.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeletionPlan {
    /// Ordered decisions
    pub actions: Vec<DeletionAction>,
}

impl DeletionPlan {
    /// Check if the plan deletes nothing
    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.actions.iter().any(DeletionAction::is_delete)
    }

    /// Count deletions
    #[must_use]
    pub fn delete_count(&self) -> usize {
        self.actions.iter().filter(|a| a.is_delete()).count()
    }

    /// Count deletions against one target
    #[must_use]
    pub fn delete_count_for(&self, target: Target) -> usize {
        self.actions
            .iter()
            .filter(|a| a.is_delete() && a.target == target)
            .count()
    }

    /// Deletions only
    pub fn deletions(&self) -> impl Iterator<Item = &DeletionAction> {
        self.actions.iter().filter(|a| a.is_delete())
    }

    /// Skips only
    pub fn skips(&self) -> impl Iterator<Item = &DeletionAction> {
        self.actions.iter().filter(|a| !a.is_delete())
    }
}

/// Fold the remote and local listings into one inventory keyed by name.
///
/// Remote branches come first in listing order, followed by local-only
/// branches in local order. Repeated names keep their first position.
pub fn reconcile(remote: &[RemoteBranch], local: &[LocalBranch]) -> Vec<Branch> {
    let local_by_name: HashMap<&str, &LocalBranch> =
        local.iter().map(|b| (b.name.as_str(), b)).collect();
    let mut seen = HashSet::new();
    let mut inventory = Vec::with_capacity(remote.len() + local.len());

    for branch in remote {
        if !seen.insert(branch.name.as_str()) {
            continue;
        }
        let local_copy = local_by_name.get(branch.name.as_str());
        inventory.push(Branch {
            name: branch.name.clone(),
            origin: if local_copy.is_some() {
                BranchOrigin::Both
            } else {
                BranchOrigin::Remote
            },
            protected: branch.protected,
            is_current: local_copy.is_some_and(|l| l.is_current),
        });
    }

    for branch in local {
        if !seen.insert(branch.name.as_str()) {
            continue;
        }
        inventory.push(Branch {
            name: branch.name.clone(),
            origin: BranchOrigin::Local,
            protected: false,
            is_current: branch.is_current,
        });
    }

    inventory
}

/// Remote branches whose merge status the planner will consult.
///
/// The base branch and protected branches are skipped regardless of merge
/// status, so they are not worth a query.
pub fn merge_candidates<'a>(remote: &'a [RemoteBranch], base_branch: &str) -> Vec<&'a str> {
    remote
        .iter()
        .filter(|b| b.name != base_branch && !b.protected)
        .map(|b| b.name.as_str())
        .collect()
}

/// Create a deletion plan (PURE - no I/O, easily testable)
///
/// # Arguments
/// * `remote` - Branches on the host, in listing order
/// * `local` - Local branches, in listing order
/// * `tracking` - Remote-tracking branch names (prefix stripped), after prune
/// * `statuses` - Merge status per remote branch; absent means `Unknown`
/// * `options` - Base branch, keep list, enabled targets
#[must_use]
pub fn create_deletion_plan(
    remote: &[RemoteBranch],
    local: &[LocalBranch],
    tracking: &[String],
    statuses: &MergeStatusMap,
    options: &PlanOptions,
) -> DeletionPlan {
    let base = options.base_branch.as_str();
    let inventory = reconcile(remote, local);
    let tracked: HashSet<&str> = tracking.iter().map(String::as_str).collect();

    let mut remote_deletes = Vec::new();
    let mut paired_local_deletes = Vec::new();
    let mut orphan_deletes = Vec::new();
    let mut skips = Vec::new();

    for branch in inventory.iter().filter(|b| b.origin.on_remote()) {
        let blocker = if branch.name == base {
            Some(Reason::IsBaseBranch)
        } else if branch.protected {
            Some(Reason::IsProtected)
        } else {
            match statuses.get(&branch.name) {
                MergeStatus::Merged => None,
                MergeStatus::NotMerged => Some(Reason::NotMerged),
                MergeStatus::Unknown => Some(Reason::MergeStatusUnknown),
            }
        };

        if let Some(reason) = blocker {
            skips.push(DeletionAction::skip(&branch.name, Target::Remote, reason));
            continue;
        }

        if options.delete_remote {
            remote_deletes.push(DeletionAction::delete(
                &branch.name,
                Target::Remote,
                Reason::Eligible,
            ));
        }

        if options.delete_local && branch.origin.on_local() {
            if branch.is_current {
                skips.push(DeletionAction::skip(
                    &branch.name,
                    Target::Local,
                    Reason::IsCheckedOut,
                ));
            } else {
                paired_local_deletes.push(DeletionAction::delete(
                    &branch.name,
                    Target::Local,
                    Reason::Eligible,
                ));
            }
        }
    }

    if options.delete_local {
        for branch in inventory.iter().filter(|b| b.origin == BranchOrigin::Local) {
            let excluded = branch.is_current
                || branch.name == base
                || tracked.contains(branch.name.as_str())
                || options.is_kept(&branch.name);
            if !excluded {
                orphan_deletes.push(DeletionAction::delete(
                    &branch.name,
                    Target::Local,
                    Reason::Orphaned,
                ));
            }
        }
    }

    let mut actions = remote_deletes;
    actions.extend(paired_local_deletes);
    actions.extend(orphan_deletes);
    actions.extend(skips);

    // The base branch is never deleted, whatever the inputs say
    actions.retain(|a| !(a.is_delete() && a.branch == base));

    DeletionPlan { actions }
}
