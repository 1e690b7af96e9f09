//! Shared command context
//!
//! Turns command-line settings into a validated [`Config`], an opened
//! repository and a ready platform service.

use branch_sweep::auth::resolve_token;
use branch_sweep::config::{Config, DEFAULT_TIMEOUT_SECS, Settings, resolve_platform};
use branch_sweep::error::Result;
use branch_sweep::git::GitCli;
use branch_sweep::platform::{PlatformService, create_platform_service};
use branch_sweep::types::Platform;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// Tokens given on the command line or through the environment
#[derive(Debug, Clone, Default)]
pub struct ExplicitTokens {
    /// `--token`, used for either platform
    pub any: Option<String>,
    /// `GITHUB_TOKEN`
    pub github: Option<String>,
    /// `GITLAB_TOKEN`
    pub gitlab: Option<String>,
}

impl ExplicitTokens {
    /// The token to use for `platform`, if one was given
    pub fn for_platform(&self, platform: Platform) -> Option<&str> {
        let specific = match platform {
            Platform::GitHub => &self.github,
            Platform::GitLab => &self.gitlab,
        };
        self.any.as_deref().or(specific.as_deref())
    }
}

/// Everything a sweep needs, resolved once at startup
///
/// Setup order:
/// - find the repository containing `path`
/// - merge command-line settings over the config file and validate them
/// - read the remote URL and detect the hosted repository
/// - resolve the token and create the platform service
pub struct CommandContext {
    /// The local clone
    pub repo: GitCli,
    /// Platform service (GitHub/GitLab)
    pub platform: Box<dyn PlatformService>,
    /// Validated run configuration
    pub config: Config,
}

impl CommandContext {
    /// Create a new command context
    pub async fn new(
        path: &Path,
        overrides: Settings,
        config_file: Option<&Path>,
        tokens: &ExplicitTokens,
    ) -> Result<Self> {
        let startup_timeout = overrides
            .timeout_secs
            .map_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS), Duration::from_secs);
        let discovered = GitCli::discover(path, startup_timeout).await?;

        let settings = overrides.or(Settings::discover(discovered.root(), config_file)?);
        settings.validate()?;
        let timeout = settings.timeout();
        let repo = GitCli::new(discovered.root(), timeout);

        let remote_name = settings.remote_name();
        let remote_url = repo.remote_url(remote_name).await?;
        let platform_config = resolve_platform(&settings, &remote_url)?;
        debug!(
            remote = remote_name,
            platform = %platform_config.platform,
            owner = %platform_config.owner,
            repo = %platform_config.repo,
            "detected repository"
        );

        let auth = resolve_token(
            platform_config.platform,
            tokens.for_platform(platform_config.platform),
            platform_config.host.as_deref(),
            timeout,
        )
        .await?;
        debug!(source = ?auth.source, "resolved token");

        let config = Config::build(&settings, platform_config, auth.token)?;
        let platform =
            create_platform_service(&config.platform, &config.token, config.request_timeout)?;
        info!(
            root = %repo.root().display(),
            base = %config.base_branch,
            "context ready"
        );

        Ok(Self {
            repo,
            platform,
            config,
        })
    }
}
