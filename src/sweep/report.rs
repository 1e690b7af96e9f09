//! Run report and summary

use crate::types::{Decision, DeletionAction, Outcome, Reason, Target};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// One planned action and what happened to it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportEntry {
    /// The planned action
    pub action: DeletionAction,
    /// What happened
    pub outcome: Outcome,
}

/// Outcome of a whole run, in canonical plan order
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// One entry per plan action
    pub entries: Vec<ReportEntry>,
    /// When execution started
    pub started_at: DateTime<Utc>,
    /// When execution finished
    pub finished_at: DateTime<Utc>,
    /// Whether an interrupt stopped new deletions from being issued
    pub interrupted: bool,
}

/// Counts for one target
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct TargetSummary {
    /// Deletions that succeeded
    pub deleted: usize,
    /// Deletions that failed
    pub failed: usize,
    /// Deletions never issued (interrupted run)
    pub not_attempted: usize,
    /// Skips by reason
    pub skipped: BTreeMap<Reason, usize>,
}

impl TargetSummary {
    /// Total skips
    pub fn skipped_total(&self) -> usize {
        self.skipped.values().sum()
    }
}

/// Per-target counts for a run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Remote host
    pub remote: TargetSummary,
    /// Local working copy
    pub local: TargetSummary,
}

impl Summary {
    /// Counts for `target`
    pub const fn for_target(&self, target: Target) -> &TargetSummary {
        match target {
            Target::Remote => &self.remote,
            Target::Local => &self.local,
        }
    }
}

impl RunReport {
    /// Entries whose deletion failed
    pub fn failures(&self) -> impl Iterator<Item = &ReportEntry> {
        self.entries.iter().filter(|e| e.outcome.is_failed())
    }

    /// Whether every issued deletion succeeded
    pub fn is_success(&self) -> bool {
        self.failures().next().is_none() && !self.interrupted
    }

    /// Count outcomes per target
    pub fn summary(&self) -> Summary {
        let mut summary = Summary::default();
        for entry in &self.entries {
            let counts = match entry.action.target {
                Target::Remote => &mut summary.remote,
                Target::Local => &mut summary.local,
            };
            match (entry.action.decision, &entry.outcome) {
                (Decision::Skip, _) => {
                    *counts.skipped.entry(entry.action.reason).or_default() += 1;
                }
                (Decision::Delete, Outcome::Succeeded) => counts.deleted += 1,
                (Decision::Delete, Outcome::Failed(_)) => counts.failed += 1,
                (Decision::Delete, Outcome::NotAttempted) => counts.not_attempted += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: DeletionAction, outcome: Outcome) -> ReportEntry {
        ReportEntry { action, outcome }
    }

    fn report(entries: Vec<ReportEntry>) -> RunReport {
        let now = Utc::now();
        RunReport {
            entries,
            started_at: now,
            finished_at: now,
            interrupted: false,
        }
    }

    #[test]
    fn test_summary_counts_per_target() {
        let report = report(vec![
            entry(
                DeletionAction::delete("f1", Target::Remote, Reason::Eligible),
                Outcome::Succeeded,
            ),
            entry(
                DeletionAction::delete("f2", Target::Remote, Reason::Eligible),
                Outcome::Failed("403".into()),
            ),
            entry(
                DeletionAction::delete("f1", Target::Local, Reason::Eligible),
                Outcome::Succeeded,
            ),
            entry(
                DeletionAction::delete("spike", Target::Local, Reason::Orphaned),
                Outcome::Succeeded,
            ),
            entry(
                DeletionAction::skip("main", Target::Remote, Reason::IsBaseBranch),
                Outcome::NotAttempted,
            ),
            entry(
                DeletionAction::skip("f3", Target::Remote, Reason::NotMerged),
                Outcome::NotAttempted,
            ),
            entry(
                DeletionAction::skip("f4", Target::Remote, Reason::NotMerged),
                Outcome::NotAttempted,
            ),
        ]);

        let summary = report.summary();

        assert_eq!(summary.remote.deleted, 1);
        assert_eq!(summary.remote.failed, 1);
        assert_eq!(summary.remote.skipped_total(), 3);
        assert_eq!(summary.remote.skipped[&Reason::NotMerged], 2);
        assert_eq!(summary.remote.skipped[&Reason::IsBaseBranch], 1);
        assert_eq!(summary.local.deleted, 2);
        assert_eq!(summary.local.failed, 0);
        assert_eq!(summary.for_target(Target::Local).skipped_total(), 0);
        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_unissued_deletes_count_as_not_attempted() {
        let mut report = report(vec![entry(
            DeletionAction::delete("f1", Target::Remote, Reason::Eligible),
            Outcome::NotAttempted,
        )]);
        report.interrupted = true;

        assert_eq!(report.summary().remote.not_attempted, 1);
        assert!(!report.is_success());
    }

    #[test]
    fn test_report_serializes_outcome_tags() {
        let report = report(vec![entry(
            DeletionAction::delete("f2", Target::Remote, Reason::Eligible),
            Outcome::Failed("permission denied".into()),
        )]);

        let json = serde_json::to_value(&report).unwrap();
        let first = &json["entries"][0];
        assert_eq!(first["action"]["target"], "remote");
        assert_eq!(first["action"]["reason"], "eligible");
        assert_eq!(first["outcome"]["status"], "failed");
        assert_eq!(first["outcome"]["detail"], "permission denied");
    }
}
