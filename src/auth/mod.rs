//! Authentication for GitHub and GitLab
//!
//! Supports explicit tokens (flag, environment, `.env`) and CLI-based auth
//! (gh, glab).

mod github;
mod gitlab;

pub use github::get_github_auth;
pub use gitlab::get_gitlab_auth;

use crate::error::Result;
use crate::types::Platform;
use std::time::Duration;

/// Source of authentication token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthSource {
    /// Token from CLI tool (gh or glab)
    Cli,
    /// Token passed in explicitly (flag or environment variable)
    Explicit,
}

/// A host token that never shows up in `Debug` output or logs
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    /// Wrap a token
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The raw token, for building request headers
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret(\"***\")")
    }
}

/// A resolved host token and where it came from
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// The token
    pub token: Secret,
    /// Where it came from
    pub source: AuthSource,
}

/// Resolve a token for `platform`.
///
/// An explicit, non-empty token wins; otherwise the platform CLI is asked.
pub async fn resolve_token(
    platform: Platform,
    explicit: Option<&str>,
    host: Option<&str>,
    timeout: Duration,
) -> Result<AuthConfig> {
    match platform {
        Platform::GitHub => get_github_auth(explicit, host, timeout).await,
        Platform::GitLab => get_gitlab_auth(explicit, host, timeout).await,
    }
}

/// An explicit token, if one was given and is not blank
fn explicit_token(explicit: Option<&str>) -> Option<AuthConfig> {
    explicit
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| AuthConfig {
            token: Secret::new(t),
            source: AuthSource::Explicit,
        })
}
