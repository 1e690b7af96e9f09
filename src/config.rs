//! Run configuration
//!
//! [`Settings`] is one layer of optional values (command line, config file).
//! Layers are merged with [`Settings::or`], then validated once into the
//! immutable [`Config`] every phase borrows from. Nothing here reads the
//! environment; the binary folds environment variables into the command-line
//! layer.

use crate::auth::Secret;
use crate::error::{Error, Result};
use crate::platform::{parse_repo_info, parse_repo_info_as};
use crate::sweep::{ExecuteOptions, GatherOptions, PlanOptions};
use crate::types::{Platform, PlatformConfig};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Remote used when none is configured
pub const DEFAULT_REMOTE: &str = "origin";
/// Per-call budget when none is configured
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;
/// In-flight remote calls when none is configured
pub const DEFAULT_CONCURRENCY: usize = 4;
/// Config file looked up at the repository root
pub const REPO_CONFIG_FILE: &str = ".branch-sweep.toml";

/// One layer of optional settings
///
/// ```toml
/// base_branch = "main"
/// remote = "origin"
/// timeout_secs = 30
/// concurrency = 4
/// keep = ["develop"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// Branch merges are checked against
    pub base_branch: Option<String>,
    /// Git remote to sync and detect the repository from
    pub remote: Option<String>,
    /// Repository owner (detected from the remote URL when absent)
    pub owner: Option<String>,
    /// Repository name (detected from the remote URL when absent)
    pub repo: Option<String>,
    /// Self-hosted host (detected from the remote URL when absent)
    pub host: Option<String>,
    /// Platform, for self-hosted hosts the URL gives no hint about
    pub platform: Option<Platform>,
    /// Budget per remote call or subprocess, in seconds
    pub timeout_secs: Option<u64>,
    /// Remote calls in flight at once
    pub concurrency: Option<usize>,
    /// Local names never removed as orphans, on top of `main` and `master`
    pub keep: Option<Vec<String>>,
    /// Leave the remote host untouched
    pub no_remote: Option<bool>,
    /// Leave the local clone untouched
    pub no_local: Option<bool>,
}

impl Settings {
    /// Fill every unset field from `fallback`
    #[must_use]
    pub fn or(self, fallback: Self) -> Self {
        Self {
            base_branch: self.base_branch.or(fallback.base_branch),
            remote: self.remote.or(fallback.remote),
            owner: self.owner.or(fallback.owner),
            repo: self.repo.or(fallback.repo),
            host: self.host.or(fallback.host),
            platform: self.platform.or(fallback.platform),
            timeout_secs: self.timeout_secs.or(fallback.timeout_secs),
            concurrency: self.concurrency.or(fallback.concurrency),
            keep: self.keep.or(fallback.keep),
            no_remote: self.no_remote.or(fallback.no_remote),
            no_local: self.no_local.or(fallback.no_local),
        }
    }

    /// Read a TOML settings file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("invalid config {}: {e}", path.display())))
    }

    /// Load the file layer.
    ///
    /// `explicit` must exist. Otherwise the first existing file of
    /// `<repo_root>/.branch-sweep.toml` and `<config dir>/branch-sweep/config.toml`
    /// is used, and no file at all yields empty settings.
    pub fn discover(repo_root: &Path, explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load(path);
        }

        let candidates = [
            Some(repo_root.join(REPO_CONFIG_FILE)),
            user_config_path(),
        ];
        for path in candidates.into_iter().flatten() {
            if path.is_file() {
                debug!(path = %path.display(), "loading config file");
                return Self::load(&path);
            }
        }
        Ok(Self::default())
    }

    /// Selected remote, `origin` by default
    pub fn remote_name(&self) -> &str {
        self.remote.as_deref().unwrap_or(DEFAULT_REMOTE)
    }

    /// Per-call budget, 30 seconds by default
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(DEFAULT_TIMEOUT_SECS))
    }

    /// Reject settings no run can start from.
    ///
    /// Runs before any remote is contacted so usage errors surface first.
    pub fn validate(&self) -> Result<()> {
        match self.base_branch.as_deref().map(str::trim) {
            None | Some("") => {
                return Err(Error::Config(
                    "base branch is required (--base, BASE_BRANCH or base_branch in the config file)"
                        .to_string(),
                ));
            }
            Some(_) => {}
        }
        if self.timeout_secs == Some(0) {
            return Err(Error::Config("timeout must be at least 1 second".to_string()));
        }
        if self.concurrency == Some(0) {
            return Err(Error::Config("concurrency must be at least 1".to_string()));
        }
        if self.no_remote.unwrap_or(false) && self.no_local.unwrap_or(false) {
            return Err(Error::Config(
                "--no-remote and --no-local together leave nothing to do".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<config dir>/branch-sweep/config.toml`
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("branch-sweep").join("config.toml"))
}

/// Work out which hosted repository to talk to.
///
/// The remote URL is parsed (with the configured platform when one is set);
/// configured owner, repo and host override what the URL says. When the URL
/// cannot be parsed, platform, owner and repo must all be configured.
pub fn resolve_platform(settings: &Settings, remote_url: &str) -> Result<PlatformConfig> {
    let detected = match settings.platform {
        Some(platform) => parse_repo_info_as(remote_url, platform),
        None => parse_repo_info(remote_url),
    };

    match detected {
        Ok(mut config) => {
            if let Some(owner) = &settings.owner {
                config.owner.clone_from(owner);
            }
            if let Some(repo) = &settings.repo {
                config.repo.clone_from(repo);
            }
            if settings.host.is_some() {
                config.host.clone_from(&settings.host);
            }
            Ok(config)
        }
        Err(e) => match (settings.platform, &settings.owner, &settings.repo) {
            (Some(platform), Some(owner), Some(repo)) => Ok(PlatformConfig {
                platform,
                owner: owner.clone(),
                repo: repo.clone(),
                host: settings.host.clone(),
            }),
            _ => Err(e),
        },
    }
}

/// Validated, immutable configuration for one run
#[derive(Debug, Clone)]
pub struct Config {
    /// Protected integration branch
    pub base_branch: String,
    /// Git remote name
    pub remote_name: String,
    /// Hosted repository
    pub platform: PlatformConfig,
    /// Host token
    pub token: Secret,
    /// Budget per remote call or subprocess
    pub request_timeout: Duration,
    /// Remote calls in flight at once
    pub concurrency_limit: usize,
    /// Extra local names never removed as orphans
    pub keep: Vec<String>,
    /// Delete on the remote host
    pub delete_remote: bool,
    /// Delete in the local clone
    pub delete_local: bool,
}

impl Config {
    /// Build the run configuration from merged settings
    pub fn build(settings: &Settings, platform: PlatformConfig, token: Secret) -> Result<Self> {
        settings.validate()?;
        let base_branch = settings
            .base_branch
            .as_deref()
            .map(str::trim)
            .unwrap_or_default()
            .to_string();

        Ok(Self {
            base_branch,
            remote_name: settings.remote_name().to_string(),
            platform,
            token,
            request_timeout: settings.timeout(),
            concurrency_limit: settings.concurrency.unwrap_or(DEFAULT_CONCURRENCY),
            keep: settings.keep.clone().unwrap_or_default(),
            delete_remote: !settings.no_remote.unwrap_or(false),
            delete_local: !settings.no_local.unwrap_or(false),
        })
    }

    /// Options for the planner
    pub fn plan_options(&self) -> PlanOptions {
        PlanOptions {
            base_branch: self.base_branch.clone(),
            keep: self.keep.clone(),
            delete_remote: self.delete_remote,
            delete_local: self.delete_local,
        }
    }

    /// Options for the gather phase
    pub fn gather_options(&self) -> GatherOptions {
        GatherOptions {
            remote_name: self.remote_name.clone(),
            base_branch: self.base_branch.clone(),
            concurrency: self.concurrency_limit,
            timeout: self.request_timeout,
        }
    }

    /// Options for the executor
    pub fn execute_options(&self) -> ExecuteOptions {
        ExecuteOptions {
            base_branch: self.base_branch.clone(),
            concurrency: self.concurrency_limit,
            timeout: self.request_timeout,
        }
    }
}
