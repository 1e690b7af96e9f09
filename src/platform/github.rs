//! GitHub platform service implementation

use crate::error::{Error, Result};
use crate::platform::{MAX_PAGES, PER_PAGE, PlatformService};
use crate::types::{ClosedRequest, Platform, PlatformConfig, RemoteBranch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use octocrab::Octocrab;
use octocrab::params::repos::Reference;
use reqwest::Client;
use reqwest::header::{HeaderMap, LINK};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

/// Pull request fields needed to decide merge status
#[derive(Deserialize)]
struct PullSummary {
    number: u64,
    merged_at: Option<DateTime<Utc>>,
}

/// GitHub service using octocrab
///
/// Branch listing and deletion go through octocrab. The closed pull request
/// query uses raw HTTP so pagination can be driven explicitly and only the
/// merge timestamp has to deserialize.
pub struct GitHubService {
    client: Octocrab,
    config: PlatformConfig,
    /// Token for raw HTTP requests (pull request query)
    token: String,
    /// HTTP client for raw requests
    http_client: Client,
    /// API base for raw requests, e.g. `https://api.github.com`
    api_base: String,
}

impl GitHubService {
    /// Create a new GitHub service
    pub fn new(
        token: &str,
        owner: String,
        repo: String,
        host: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = host.as_ref().map_or_else(
            || "https://api.github.com".to_string(),
            |h| format!("https://{h}/api/v3"),
        );
        let config = PlatformConfig {
            platform: Platform::GitHub,
            owner,
            repo,
            host,
        };
        Self::with_api_base(token, config, api_base, timeout)
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(
        token: &str,
        config: PlatformConfig,
        api_base: String,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = api_base.trim_end_matches('/').to_string();

        let client = Octocrab::builder()
            .personal_token(token.to_string())
            .base_uri(api_base.as_str())
            .map_err(|e| Error::GitHubApi(e.to_string()))?
            .build()
            .map_err(|e| Error::GitHubApi(e.to_string()))?;

        let http_client = Client::builder()
            .user_agent("branch-sweep")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GitHubApi(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            config,
            token: token.to_string(),
            http_client,
            api_base,
        })
    }

    fn pulls_url(&self, source: &str, target: &str) -> String {
        let head = format!("{}:{source}", self.config.owner);
        format!(
            "{}/repos/{}/{}/pulls?state=closed&base={}&head={}&per_page={PER_PAGE}&page=1",
            self.api_base,
            self.config.owner,
            self.config.repo,
            urlencoding::encode(target),
            urlencoding::encode(&head),
        )
    }
}

/// Extract the `rel="next"` target from a `Link` header
fn next_page_link(headers: &HeaderMap) -> Option<String> {
    let link = headers.get(LINK)?.to_str().ok()?;
    link.split(',').find_map(|part| {
        let (target, params) = part.split_once(';')?;
        let is_next = params
            .split(';')
            .any(|p| p.trim().replace(' ', "") == "rel=\"next\"");
        is_next.then(|| {
            target
                .trim()
                .trim_start_matches('<')
                .trim_end_matches('>')
                .to_string()
        })
    })
}

#[async_trait]
impl PlatformService for GitHubService {
    async fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        debug!("listing branches");
        let first = self
            .client
            .repos(&self.config.owner, &self.config.repo)
            .list_branches()
            .per_page(u8::try_from(PER_PAGE).unwrap_or(u8::MAX))
            .send()
            .await?;

        let branches: Vec<RemoteBranch> = self
            .client
            .all_pages(first)
            .await?
            .into_iter()
            .map(|b| RemoteBranch {
                name: b.name,
                protected: b.protected,
            })
            .collect();

        debug!(count = branches.len(), "listed branches");
        Ok(branches)
    }

    async fn list_closed_requests(
        &self,
        source: &str,
        target: &str,
    ) -> Result<Vec<ClosedRequest>> {
        debug!(source, target, "listing closed PRs");
        let mut requests = Vec::new();
        let mut next = Some(self.pulls_url(source, target));
        let mut pages = 0;

        while let Some(url) = next.take() {
            pages += 1;
            if pages > MAX_PAGES {
                return Err(Error::GitHubApi(format!(
                    "pull request listing for {source} exceeded {MAX_PAGES} pages"
                )));
            }

            let response = self
                .http_client
                .get(&url)
                .header("Authorization", format!("Bearer {}", self.token))
                .header("Accept", "application/vnd.github+json")
                .header("X-GitHub-Api-Version", "2022-11-28")
                .send()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to list pull requests: {e}")))?;

            if !response.status().is_success() {
                return Err(Error::GitHubApi(format!(
                    "listing pull requests for {source} returned {}",
                    response.status()
                )));
            }

            next = next_page_link(response.headers());
            let page: Vec<PullSummary> = response
                .json()
                .await
                .map_err(|e| Error::GitHubApi(format!("Failed to parse pull requests: {e}")))?;

            requests.extend(page.into_iter().map(|pr| ClosedRequest {
                number: pr.number,
                merged_at: pr.merged_at,
            }));
        }

        debug!(source, count = requests.len(), pages, "listed closed PRs");
        Ok(requests)
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        debug!(branch = name, "deleting remote branch");
        self.client
            .repos(&self.config.owner, &self.config.repo)
            .delete_ref(&Reference::Branch(name.to_string()))
            .await?;
        debug!(branch = name, "deleted remote branch");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}
