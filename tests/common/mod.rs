//! Shared test fixtures

#![allow(dead_code)]

mod mock_git;
mod mock_platform;

pub use mock_git::MockLocalRepository;
pub use mock_platform::{ClosedRequestsCall, MockPlatformService};

use branch_sweep::oracle::MergeStatusMap;
use branch_sweep::types::{LocalBranch, MergeStatus, Platform, PlatformConfig, RemoteBranch};
use std::path::Path;
use std::process::Command;

/// GitHub config for `acme/widgets`
pub fn github_config() -> PlatformConfig {
    PlatformConfig {
        platform: Platform::GitHub,
        owner: "acme".to_string(),
        repo: "widgets".to_string(),
        host: None,
    }
}

/// Remote branches from `(name, protected)` pairs
pub fn remote(branches: &[(&str, bool)]) -> Vec<RemoteBranch> {
    branches
        .iter()
        .map(|(name, protected)| RemoteBranch::new(*name, *protected))
        .collect()
}

/// Local branches from `(name, is_current)` pairs
pub fn local(branches: &[(&str, bool)]) -> Vec<LocalBranch> {
    branches
        .iter()
        .map(|(name, current)| LocalBranch::new(*name, *current))
        .collect()
}

/// Owned tracking names
pub fn tracking(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

/// Merge status map from `(name, status)` pairs
pub fn statuses(entries: &[(&str, MergeStatus)]) -> MergeStatusMap {
    entries.iter().map(|(name, status)| (*name, *status)).collect()
}

/// Run git in `dir`, panicking on failure
pub fn git(dir: &Path, args: &[&str]) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "Test")
        .env("GIT_AUTHOR_EMAIL", "test@example.com")
        .env("GIT_COMMITTER_NAME", "Test")
        .env("GIT_COMMITTER_EMAIL", "test@example.com")
        .output()
        .expect("failed to run git");
    assert!(
        output.status.success(),
        "git {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}
