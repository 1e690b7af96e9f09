//! Mock local repository for testing

#![allow(dead_code)]

use async_trait::async_trait;
use branch_sweep::error::{Error, Result};
use branch_sweep::git::LocalRepository;
use branch_sweep::types::LocalBranch;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory stand-in for a git clone
///
/// `sync_with_remote` only records the call; tests set the tracking refs a
/// fetch would have left behind with [`MockLocalRepository::set_tracking`].
pub struct MockLocalRepository {
    branches: Mutex<Vec<LocalBranch>>,
    tracking: Mutex<Vec<String>>,
    // Call tracking
    sync_calls: Mutex<Vec<String>>,
    delete_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_sync: Mutex<Option<String>>,
    error_on_delete: Mutex<HashMap<String, String>>,
    // Latency and concurrency tracking
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockLocalRepository {
    /// Create a clone with `branches` as `(name, is_current)`
    pub fn with_branches(branches: &[(&str, bool)]) -> Self {
        Self {
            branches: Mutex::new(
                branches
                    .iter()
                    .map(|(name, current)| LocalBranch::new(*name, *current))
                    .collect(),
            ),
            tracking: Mutex::new(Vec::new()),
            sync_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            error_on_sync: Mutex::new(None),
            error_on_delete: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Set the remote-tracking names the clone has after syncing
    pub fn set_tracking(&self, names: &[&str]) {
        *self.tracking.lock().unwrap() = names.iter().map(ToString::to_string).collect();
    }

    /// Set the remote-tracking names from owned strings
    pub fn set_tracking_owned(&self, names: Vec<String>) {
        *self.tracking.lock().unwrap() = names;
    }

    /// Delay every deletion by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Make `sync_with_remote` fail
    pub fn fail_sync(&self, msg: &str) {
        *self.error_on_sync.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `delete_branch` fail for `branch`
    pub fn fail_delete(&self, branch: &str, msg: &str) {
        self.error_on_delete
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    /// Current branch names
    pub fn branch_names(&self) -> Vec<String> {
        self.branches
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// Remotes passed to `sync_with_remote`
    pub fn sync_calls(&self) -> Vec<String> {
        self.sync_calls.lock().unwrap().clone()
    }

    /// Branch names passed to `delete_branch`, in call order
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Highest number of deletions observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocalRepository for MockLocalRepository {
    async fn sync_with_remote(&self, remote: &str) -> Result<()> {
        self.sync_calls.lock().unwrap().push(remote.to_string());
        if let Some(msg) = self.error_on_sync.lock().unwrap().clone() {
            return Err(Error::Git(msg));
        }
        Ok(())
    }

    async fn list_local_branches(&self) -> Result<Vec<LocalBranch>> {
        Ok(self.branches.lock().unwrap().clone())
    }

    async fn list_remote_tracking(&self, _remote: &str) -> Result<Vec<String>> {
        Ok(self.tracking.lock().unwrap().clone())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(name.to_string());

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if let Some(msg) = self.error_on_delete.lock().unwrap().get(name) {
            return Err(Error::Git(msg.clone()));
        }
        self.branches.lock().unwrap().retain(|b| b.name != name);
        Ok(())
    }
}
