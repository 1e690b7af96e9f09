//! GitHub token resolution

use super::{AuthConfig, AuthSource, Secret, explicit_token};
use crate::error::{Error, Result};
use crate::process::run_command;
use std::time::Duration;
use tracing::debug;

/// Get a GitHub token: explicit first, then `gh auth token`
pub async fn get_github_auth(
    explicit: Option<&str>,
    host: Option<&str>,
    timeout: Duration,
) -> Result<AuthConfig> {
    if let Some(auth) = explicit_token(explicit) {
        debug!("using explicit GitHub token");
        return Ok(auth);
    }

    let mut args = vec!["auth", "token"];
    if let Some(h) = host {
        args.extend(["--hostname", h]);
    }

    debug!("asking gh for a token");
    let output = run_command("gh", &args, None, timeout).await.map_err(|e| {
        Error::Auth(format!(
            "no GitHub token given and `gh auth token` failed ({e}). Set GITHUB_TOKEN or run `gh auth login`."
        ))
    })?;

    let token = output.stdout.trim();
    if token.is_empty() {
        return Err(Error::Auth(
            "`gh auth token` returned an empty token".to_string(),
        ));
    }

    Ok(AuthConfig {
        token: Secret::new(token),
        source: AuthSource::Cli,
    })
}
