//! GitLab token resolution

use super::{AuthConfig, AuthSource, Secret, explicit_token};
use crate::error::{Error, Result};
use crate::process::run_command;
use std::time::Duration;
use tracing::debug;

/// Get a GitLab token: explicit first, then `glab config get token`
pub async fn get_gitlab_auth(
    explicit: Option<&str>,
    host: Option<&str>,
    timeout: Duration,
) -> Result<AuthConfig> {
    if let Some(auth) = explicit_token(explicit) {
        debug!("using explicit GitLab token");
        return Ok(auth);
    }

    let host = host.unwrap_or("gitlab.com");
    debug!(host, "asking glab for a token");
    let output = run_command(
        "glab",
        &["config", "get", "token", "--host", host],
        None,
        timeout,
    )
    .await
    .map_err(|e| {
        Error::Auth(format!(
            "no GitLab token given and `glab config get token` failed ({e}). Set GITLAB_TOKEN or run `glab auth login`."
        ))
    })?;

    let token = output.stdout.trim();
    if token.is_empty() {
        return Err(Error::Auth(format!(
            "glab has no token stored for {host}"
        )));
    }

    Ok(AuthConfig {
        token: Secret::new(token),
        source: AuthSource::Cli,
    })
}
