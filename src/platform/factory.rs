//! Platform service construction

use crate::auth::Secret;
use crate::error::Result;
use crate::platform::{GitHubService, GitLabService, PlatformService};
use crate::types::{Platform, PlatformConfig};
use std::time::Duration;

/// Create the platform service for a resolved repository.
///
/// `timeout` bounds each HTTP request issued by the service's own client.
pub fn create_platform_service(
    config: &PlatformConfig,
    token: &Secret,
    timeout: Duration,
) -> Result<Box<dyn PlatformService>> {
    match config.platform {
        Platform::GitHub => Ok(Box::new(GitHubService::new(
            token.expose(),
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
            timeout,
        )?)),
        Platform::GitLab => Ok(Box::new(GitLabService::new(
            token.expose().to_string(),
            config.owner.clone(),
            config.repo.clone(),
            config.host.clone(),
            timeout,
        )?)),
    }
}
