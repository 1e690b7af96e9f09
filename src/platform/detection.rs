//! Platform and repository detection from git remote URLs

use crate::error::{Error, Result};
use crate::types::{Platform, PlatformConfig};
use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// scp-like syntax: `[user@]host:path`
static SCP_LIKE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:[A-Za-z0-9._-]+@)?([A-Za-z0-9.-]+):([^/].*)$").expect("valid regex")
});

/// Detect the platform from a remote URL.
///
/// Recognizes github.com and gitlab.com, plus self-hosted instances whose
/// hostname starts with `github.` or `gitlab.`. Anything else needs an
/// explicit platform (see [`parse_repo_info_as`]).
fn detect_platform(url: &str) -> Option<Platform> {
    let (host, _) = split_remote_url(url)?;
    platform_for_host(&host)
}

/// Parse owner/repo/host from a remote URL and detect its platform
pub fn parse_repo_info(url: &str) -> Result<PlatformConfig> {
    let platform = detect_platform(url).ok_or(Error::NoSupportedRemotes)?;
    parse_repo_info_as(url, platform)
}

/// Parse owner/repo/host from a remote URL for a known platform.
///
/// Used for self-hosted instances whose hostname gives no hint.
pub fn parse_repo_info_as(url: &str, platform: Platform) -> Result<PlatformConfig> {
    let (host, path) = split_remote_url(url).ok_or(Error::NoSupportedRemotes)?;

    let path = path.trim_matches('/');
    let path = path.strip_suffix(".git").unwrap_or(path);
    let (owner, repo) = path.rsplit_once('/').ok_or(Error::NoSupportedRemotes)?;
    if owner.is_empty() || repo.is_empty() {
        return Err(Error::NoSupportedRemotes);
    }

    let public_host = match platform {
        Platform::GitHub => "github.com",
        Platform::GitLab => "gitlab.com",
    };

    Ok(PlatformConfig {
        platform,
        owner: owner.to_string(),
        repo: repo.to_string(),
        host: (host != public_host).then_some(host),
    })
}

fn platform_for_host(host: &str) -> Option<Platform> {
    let host = host.split(':').next().unwrap_or(host);
    if host == "github.com" || host.starts_with("github.") {
        Some(Platform::GitHub)
    } else if host == "gitlab.com" || host.starts_with("gitlab.") {
        Some(Platform::GitLab)
    } else {
        None
    }
}

/// Split a remote URL into `(host, path)`.
///
/// Ports are kept on the host for http(s) URLs, where they select the API
/// endpoint, and dropped for ssh URLs, where they do not.
fn split_remote_url(url: &str) -> Option<(String, String)> {
    let url = url.trim();

    if let Some(caps) = SCP_LIKE.captures(url)
        && !url.contains("://")
    {
        return Some((caps[1].to_string(), caps[2].to_string()));
    }

    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_string();
    let host = match (parsed.scheme(), parsed.port()) {
        ("http" | "https", Some(port)) => format!("{host}:{port}"),
        _ => host,
    };
    Some((host, parsed.path().to_string()))
}
