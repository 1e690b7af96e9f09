//! Mock platform service for testing
//!
//! These are test utilities - not all may be used in current tests but are
//! available for future test development.

#![allow(dead_code)]

use async_trait::async_trait;
use branch_sweep::error::{Error, Result};
use branch_sweep::platform::PlatformService;
use branch_sweep::types::{ClosedRequest, PlatformConfig, RemoteBranch};
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Duration;

/// Call record for `list_closed_requests`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClosedRequestsCall {
    pub source: String,
    pub target: String,
}

/// Simple mock platform service for testing
///
/// Features:
/// - Branch listing that reflects successful deletions
/// - Configurable closed requests per branch
/// - Call tracking for verification
/// - Error injection per branch for failure path testing
/// - Optional delay per call, with in-flight tracking for concurrency checks
pub struct MockPlatformService {
    config: PlatformConfig,
    next_request_number: AtomicU64,
    branches: Mutex<Vec<RemoteBranch>>,
    closed_requests: Mutex<HashMap<String, Vec<ClosedRequest>>>,
    // Call tracking
    list_branches_calls: AtomicUsize,
    closed_requests_calls: Mutex<Vec<ClosedRequestsCall>>,
    delete_calls: Mutex<Vec<String>>,
    // Error injection
    error_on_list_branches: Mutex<Option<String>>,
    error_on_closed_requests: Mutex<HashMap<String, String>>,
    error_on_delete: Mutex<HashMap<String, String>>,
    // Latency and concurrency tracking
    delay: Mutex<Option<Duration>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MockPlatformService {
    /// Create a new mock with the given config
    pub fn with_config(config: PlatformConfig) -> Self {
        Self {
            config,
            next_request_number: AtomicU64::new(1),
            branches: Mutex::new(Vec::new()),
            closed_requests: Mutex::new(HashMap::new()),
            list_branches_calls: AtomicUsize::new(0),
            closed_requests_calls: Mutex::new(Vec::new()),
            delete_calls: Mutex::new(Vec::new()),
            error_on_list_branches: Mutex::new(None),
            error_on_closed_requests: Mutex::new(HashMap::new()),
            error_on_delete: Mutex::new(HashMap::new()),
            delay: Mutex::new(None),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    /// Create a mock listing `branches` as `(name, protected)`
    pub fn with_branches(config: PlatformConfig, branches: &[(&str, bool)]) -> Self {
        let mock = Self::with_config(config);
        *mock.branches.lock().unwrap() = branches
            .iter()
            .map(|(name, protected)| RemoteBranch::new(*name, *protected))
            .collect();
        mock
    }

    // === Response setup ===

    /// Record a merged request from `branch`
    pub fn set_merged(&self, branch: &str) {
        let number = self.next_request_number.fetch_add(1, Ordering::SeqCst);
        self.closed_requests
            .lock()
            .unwrap()
            .entry(branch.to_string())
            .or_default()
            .push(ClosedRequest {
                number,
                merged_at: Some(Utc::now()),
            });
    }

    /// Record a request from `branch` that was closed without merging
    pub fn set_closed_unmerged(&self, branch: &str) {
        let number = self.next_request_number.fetch_add(1, Ordering::SeqCst);
        self.closed_requests
            .lock()
            .unwrap()
            .entry(branch.to_string())
            .or_default()
            .push(ClosedRequest {
                number,
                merged_at: None,
            });
    }

    /// Delay every call by `delay`
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    // === Error injection methods ===

    /// Make `list_branches` return an error
    pub fn fail_list_branches(&self, msg: &str) {
        *self.error_on_list_branches.lock().unwrap() = Some(msg.to_string());
    }

    /// Make `list_closed_requests` fail for `branch`
    pub fn fail_closed_requests(&self, branch: &str, msg: &str) {
        self.error_on_closed_requests
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    /// Make `delete_branch` fail for `branch`
    pub fn fail_delete(&self, branch: &str, msg: &str) {
        self.error_on_delete
            .lock()
            .unwrap()
            .insert(branch.to_string(), msg.to_string());
    }

    // === Call inspection ===

    /// Current branch names
    pub fn branch_names(&self) -> Vec<String> {
        self.branches
            .lock()
            .unwrap()
            .iter()
            .map(|b| b.name.clone())
            .collect()
    }

    /// Number of `list_branches` calls
    pub fn list_branches_calls(&self) -> usize {
        self.list_branches_calls.load(Ordering::SeqCst)
    }

    /// Recorded `list_closed_requests` calls
    pub fn closed_requests_calls(&self) -> Vec<ClosedRequestsCall> {
        self.closed_requests_calls.lock().unwrap().clone()
    }

    /// Branch names passed to `delete_branch`, in call order
    pub fn delete_calls(&self) -> Vec<String> {
        self.delete_calls.lock().unwrap().clone()
    }

    /// Highest number of calls observed in flight at once
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    async fn simulate_latency(&self) {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl PlatformService for MockPlatformService {
    async fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        self.list_branches_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(msg) = self.error_on_list_branches.lock().unwrap().clone() {
            return Err(Error::GitHubApi(msg));
        }
        Ok(self.branches.lock().unwrap().clone())
    }

    async fn list_closed_requests(&self, source: &str, target: &str) -> Result<Vec<ClosedRequest>> {
        self.closed_requests_calls
            .lock()
            .unwrap()
            .push(ClosedRequestsCall {
                source: source.to_string(),
                target: target.to_string(),
            });
        self.simulate_latency().await;

        if let Some(msg) = self.error_on_closed_requests.lock().unwrap().get(source) {
            return Err(Error::GitHubApi(msg.clone()));
        }
        Ok(self
            .closed_requests
            .lock()
            .unwrap()
            .get(source)
            .cloned()
            .unwrap_or_default())
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        self.delete_calls.lock().unwrap().push(name.to_string());
        self.simulate_latency().await;

        if let Some(msg) = self.error_on_delete.lock().unwrap().get(name) {
            return Err(Error::GitHubApi(msg.clone()));
        }
        self.branches.lock().unwrap().retain(|b| b.name != name);
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
