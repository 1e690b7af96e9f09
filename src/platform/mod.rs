//! Platform services for GitHub and GitLab
//!
//! Provides a unified interface over the remote host: the branch listing,
//! the closed-request query behind the merge oracle, and branch deletion.

mod detection;
mod factory;
mod github;
mod gitlab;

pub use detection::{parse_repo_info, parse_repo_info_as};
pub use factory::create_platform_service;
pub use github::GitHubService;
pub use gitlab::GitLabService;

use crate::error::Result;
use crate::types::{ClosedRequest, PlatformConfig, RemoteBranch};
use async_trait::async_trait;

/// Page size requested from both hosts (their maximum)
pub(crate) const PER_PAGE: u32 = 100;

/// Hard stop for pagination loops against a misbehaving host
pub(crate) const MAX_PAGES: u32 = 1000;

/// Platform service trait for the remote branch universe
///
/// This trait abstracts GitHub and GitLab operations, allowing the same
/// sweep logic to work with either platform. Implementations do not apply
/// per-call time budgets themselves; callers wrap each call in
/// [`crate::deadline::bounded`].
#[async_trait]
pub trait PlatformService: Send + Sync {
    /// List every branch on the host with its protection flag.
    ///
    /// Exhausts pagination. Any failure is a transport error.
    async fn list_branches(&self) -> Result<Vec<RemoteBranch>>;

    /// List closed requests whose source is `source` and target is `target`.
    ///
    /// Exhausts pagination so a merged request on a later page is never
    /// missed.
    async fn list_closed_requests(&self, source: &str, target: &str)
    -> Result<Vec<ClosedRequest>>;

    /// Delete the named branch on the host
    async fn delete_branch(&self, name: &str) -> Result<()>;

    /// Get the platform configuration
    fn config(&self) -> &PlatformConfig;
}
