//! Merge oracle: has a branch's change-set landed in the base?
//!
//! A branch counts as merged when at least one closed request from it into
//! the base carries a merge timestamp. Any failure to find out is
//! [`MergeStatus::Unknown`], which the planner treats like "not merged".

use crate::deadline::bounded;
use crate::platform::PlatformService;
use crate::types::MergeStatus;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Merge status per branch name
///
/// Lookups of branches that were never queried return `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStatusMap(HashMap<String, MergeStatus>);

impl MergeStatusMap {
    /// Empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the status of `branch`
    pub fn insert(&mut self, branch: impl Into<String>, status: MergeStatus) {
        self.0.insert(branch.into(), status);
    }

    /// Status of `branch`, `Unknown` when it was never recorded
    pub fn get(&self, branch: &str) -> MergeStatus {
        self.0.get(branch).copied().unwrap_or(MergeStatus::Unknown)
    }

    /// Number of recorded branches
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, MergeStatus)> for MergeStatusMap {
    fn from_iter<I: IntoIterator<Item = (S, MergeStatus)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Merge oracle over a platform service
pub struct MergeOracle<'a> {
    platform: &'a dyn PlatformService,
    concurrency: usize,
    timeout: Duration,
}

impl<'a> MergeOracle<'a> {
    /// Create an oracle issuing at most `concurrency` queries at once, each
    /// bounded by `timeout`
    pub fn new(platform: &'a dyn PlatformService, concurrency: usize, timeout: Duration) -> Self {
        Self {
            platform,
            concurrency: concurrency.max(1),
            timeout,
        }
    }

    /// Merge status of `branch` into `base`
    pub async fn status(&self, branch: &str, base: &str) -> MergeStatus {
        let query = bounded(
            format!("merge query for {branch}"),
            self.timeout,
            self.platform.list_closed_requests(branch, base),
        )
        .await;

        match query {
            Ok(requests) => {
                let status = if requests.iter().any(|r| r.is_merged()) {
                    MergeStatus::Merged
                } else {
                    MergeStatus::NotMerged
                };
                debug!(branch, %status, requests = requests.len(), "merge status");
                status
            }
            Err(e) => {
                warn!(branch, error = %e, "merge status unknown");
                MergeStatus::Unknown
            }
        }
    }

    /// Merge status of each branch into `base`, queried concurrently
    pub async fn statuses<I, S>(&self, branches: I, base: &str) -> MergeStatusMap
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        stream::iter(branches)
            .map(|branch| async move {
                let name = branch.as_ref().to_string();
                let status = self.status(&name, base).await;
                (name, status)
            })
            .buffer_unordered(self.concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect()
    }
}
