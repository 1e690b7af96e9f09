//! Core types for branch-sweep

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A branch as listed by the remote host
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteBranch {
    /// Branch name (without `refs/heads/`)
    pub name: String,
    /// Whether the host protects this branch
    pub protected: bool,
}

impl RemoteBranch {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, protected: bool) -> Self {
        Self {
            name: name.into(),
            protected,
        }
    }
}

/// A branch in the local working copy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocalBranch {
    /// Branch name
    pub name: String,
    /// Whether this branch is the current checkout
    pub is_current: bool,
}

impl LocalBranch {
    /// Convenience constructor
    pub fn new(name: impl Into<String>, is_current: bool) -> Self {
        Self {
            name: name.into(),
            is_current,
        }
    }
}

/// Where a branch of a given name exists
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BranchOrigin {
    /// Only on the remote host
    Remote,
    /// Only in the local working copy
    Local,
    /// On the host and in the working copy
    Both,
}

impl BranchOrigin {
    /// Whether the branch exists on the remote host
    pub const fn on_remote(self) -> bool {
        matches!(self, Self::Remote | Self::Both)
    }

    /// Whether the branch exists locally
    pub const fn on_local(self) -> bool {
        matches!(self, Self::Local | Self::Both)
    }
}

/// A branch identified by name across both universes
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Branch {
    /// Branch name, the identity
    pub name: String,
    /// Which universes contain it
    pub origin: BranchOrigin,
    /// Host protection flag (always false for local-only branches)
    pub protected: bool,
    /// Whether the local copy is the current checkout
    pub is_current: bool,
}

/// Whether a branch's change-set has landed in the base branch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergeStatus {
    /// A closed request into the base carries a merge timestamp
    Merged,
    /// No merged request into the base exists
    NotMerged,
    /// The host could not be asked; never treated as merged
    Unknown,
}

impl std::fmt::Display for MergeStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Merged => write!(f, "merged"),
            Self::NotMerged => write!(f, "not merged"),
            Self::Unknown => write!(f, "unknown"),
        }
    }
}

/// A closed pull/merge request from `source` into `target`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClosedRequest {
    /// PR number / MR iid
    pub number: u64,
    /// When it was merged; `None` when closed without merging
    pub merged_at: Option<DateTime<Utc>>,
}

impl ClosedRequest {
    /// Whether the request landed
    pub const fn is_merged(&self) -> bool {
        self.merged_at.is_some()
    }
}

/// Which universe an action applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// The branch on the remote host
    Remote,
    /// The branch in the local working copy
    Local,
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote => write!(f, "remote"),
            Self::Local => write!(f, "local"),
        }
    }
}

/// What the planner decided for one branch/target pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    /// Remove the branch
    Delete,
    /// Leave the branch alone
    Skip,
}

/// Why the planner decided what it did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Reason {
    /// The branch is the configured base branch
    IsBaseBranch,
    /// The host protects the branch
    IsProtected,
    /// No merged request into the base exists
    NotMerged,
    /// The merge query failed or timed out
    MergeStatusUnknown,
    /// The local branch is the current checkout
    IsCheckedOut,
    /// Local branch with no counterpart on the remote
    Orphaned,
    /// Merged into the base and safe to remove
    Eligible,
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            Self::IsBaseBranch => "base branch",
            Self::IsProtected => "protected",
            Self::NotMerged => "not merged",
            Self::MergeStatusUnknown => "merge status unknown",
            Self::IsCheckedOut => "checked out",
            Self::Orphaned => "orphaned",
            Self::Eligible => "merged",
        };
        f.write_str(text)
    }
}

/// A single planned decision
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeletionAction {
    /// Branch name
    pub branch: String,
    /// Universe the decision applies to
    pub target: Target,
    /// Delete or skip
    pub decision: Decision,
    /// Why
    pub reason: Reason,
}

impl DeletionAction {
    /// A `Delete` decision
    pub fn delete(branch: impl Into<String>, target: Target, reason: Reason) -> Self {
        Self {
            branch: branch.into(),
            target,
            decision: Decision::Delete,
            reason,
        }
    }

    /// A `Skip` decision
    pub fn skip(branch: impl Into<String>, target: Target, reason: Reason) -> Self {
        Self {
            branch: branch.into(),
            target,
            decision: Decision::Skip,
            reason,
        }
    }

    /// Whether this action removes something
    pub fn is_delete(&self) -> bool {
        self.decision == Decision::Delete
    }
}

impl std::fmt::Display for DeletionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let verb = match self.decision {
            Decision::Delete => "delete",
            Decision::Skip => "skip",
        };
        write!(
            f,
            "{verb} {} branch {} ({})",
            self.target, self.branch, self.reason
        )
    }
}

/// Result of applying one action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum Outcome {
    /// The deletion went through
    Succeeded,
    /// The deletion was attempted and failed
    Failed(String),
    /// Skips, and deletions never issued because the run was interrupted
    NotAttempted,
}

impl Outcome {
    /// Whether the deletion failed
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }
}

/// Detected platform type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// GitHub or GitHub Enterprise
    GitHub,
    /// GitLab or self-hosted GitLab
    GitLab,
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GitHub => write!(f, "GitHub"),
            Self::GitLab => write!(f, "GitLab"),
        }
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "github" => Ok(Self::GitHub),
            "gitlab" => Ok(Self::GitLab),
            other => Err(format!("unknown platform '{other}' (expected github or gitlab)")),
        }
    }
}

/// Platform configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformConfig {
    /// Platform type
    pub platform: Platform,
    /// Repository owner (user, organization, or GitLab group path)
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Custom host (None for github.com/gitlab.com)
    pub host: Option<String>,
}
