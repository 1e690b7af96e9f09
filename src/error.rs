//! Error types for branch-sweep

use std::time::Duration;
use thiserror::Error;

/// Exit code when a run could not build a plan
pub const EXIT_PLAN_FAILED: u8 = 1;
/// Exit code for configuration and usage errors
pub const EXIT_CONFIG: u8 = 2;
/// Exit code when the run was interrupted before execution
pub const EXIT_INTERRUPTED: u8 = 130;

/// Errors produced while gathering, planning, or executing a sweep
#[derive(Error, Debug)]
pub enum Error {
    /// GitHub API call failed
    #[error("GitHub API error: {0}")]
    GitHubApi(String),

    /// GitLab API call failed
    #[error("GitLab API error: {0}")]
    GitLabApi(String),

    /// A remote call or subprocess exceeded its time budget
    #[error("{operation} timed out after {}s", .after.as_secs())]
    Timeout {
        /// What was being attempted
        operation: String,
        /// The budget that elapsed
        after: Duration,
    },

    /// No usable host token
    #[error("authentication failed: {0}")]
    Auth(String),

    /// Local git invocation failed
    #[error("git error: {0}")]
    Git(String),

    /// Invalid or missing configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// The selected git remote does not exist
    #[error("remote '{0}' not found")]
    RemoteNotFound(String),

    /// The remote URL does not point at a supported host
    #[error("no supported remote found (GitHub or GitLab)")]
    NoSupportedRemotes,

    /// The run was interrupted before any deletion was issued
    #[error("interrupted before execution; nothing was deleted")]
    Interrupted,

    /// Unexpected internal failure
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error came from talking to the remote host
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::GitHubApi(_) | Self::GitLabApi(_) | Self::Auth(_) | Self::Timeout { .. }
        )
    }

    /// Process exit code for a run that ended with this error
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Config(_) | Self::RemoteNotFound(_) | Self::NoSupportedRemotes => EXIT_CONFIG,
            Self::Interrupted => EXIT_INTERRUPTED,
            _ => EXIT_PLAN_FAILED,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        Self::GitLabApi(e.to_string())
    }
}

impl From<octocrab::Error> for Error {
    fn from(e: octocrab::Error) -> Self {
        Self::GitHubApi(e.to_string())
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;
