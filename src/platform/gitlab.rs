//! GitLab platform service implementation

use crate::error::{Error, Result};
use crate::platform::{MAX_PAGES, PER_PAGE, PlatformService};
use crate::types::{ClosedRequest, Platform, PlatformConfig, RemoteBranch};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// GitLab service using reqwest
pub struct GitLabService {
    client: Client,
    token: String,
    /// API base, e.g. `https://gitlab.com/api/v4`
    api_base: String,
    config: PlatformConfig,
    project_path: String,
}

#[derive(Deserialize)]
struct GitLabBranch {
    name: String,
    #[serde(default)]
    protected: bool,
}

#[derive(Deserialize)]
struct MergeRequest {
    iid: u64,
    state: String, // "opened", "closed", "locked", "merged"
    merged_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl From<MergeRequest> for ClosedRequest {
    fn from(mr: MergeRequest) -> Self {
        // MRs merged before GitLab recorded merged_at only carry the state
        let merged_at = match mr.merged_at {
            Some(at) => Some(at),
            None if mr.state == "merged" => mr.updated_at,
            None => None,
        };
        Self {
            number: mr.iid,
            merged_at,
        }
    }
}

impl GitLabService {
    /// Create a new GitLab service
    pub fn new(
        token: String,
        owner: String,
        repo: String,
        host: Option<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let api_base = format!(
            "https://{}/api/v4",
            host.as_deref().unwrap_or("gitlab.com")
        );
        let config = PlatformConfig {
            platform: Platform::GitLab,
            owner,
            repo,
            host,
        };
        Self::with_api_base(token, config, api_base, timeout)
    }

    /// Create a service against an explicit API base URL
    pub fn with_api_base(
        token: String,
        config: PlatformConfig,
        api_base: String,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .user_agent("branch-sweep")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::GitLabApi(format!("failed to create HTTP client: {e}")))?;

        let project_path = format!("{}/{}", config.owner, config.repo);

        Ok(Self {
            client,
            token,
            api_base: api_base.trim_end_matches('/').to_string(),
            config,
            project_path,
        })
    }

    fn api_url(&self, path: &str) -> String {
        format!("{}{}", self.api_base, path)
    }

    fn encoded_project(&self) -> String {
        urlencoding::encode(&self.project_path).into_owned()
    }

    /// GET every page of a list endpoint, following `x-next-page`
    async fn get_all_pages<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>> {
        let url = self.api_url(path);
        let per_page = PER_PAGE.to_string();
        let mut items = Vec::new();
        let mut page = 1_u32;

        loop {
            if page > MAX_PAGES {
                return Err(Error::GitLabApi(format!(
                    "{path} exceeded {MAX_PAGES} pages"
                )));
            }

            let page_param = page.to_string();
            let response = self
                .client
                .get(&url)
                .header("PRIVATE-TOKEN", &self.token)
                .query(query)
                .query(&[("per_page", per_page.as_str()), ("page", page_param.as_str())])
                .send()
                .await?
                .error_for_status()
                .map_err(|e| Error::GitLabApi(e.to_string()))?;

            let next = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u32>().ok());

            let batch: Vec<T> = response.json().await?;
            items.extend(batch);

            match next {
                Some(n) if n > page => page = n,
                _ => break,
            }
        }

        Ok(items)
    }
}

#[async_trait]
impl PlatformService for GitLabService {
    async fn list_branches(&self) -> Result<Vec<RemoteBranch>> {
        debug!("listing branches");
        let path = format!("/projects/{}/repository/branches", self.encoded_project());

        let branches: Vec<RemoteBranch> = self
            .get_all_pages::<GitLabBranch>(&path, &[])
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
        debug!(source, target, "listing merged MRs");
        let path = format!("/projects/{}/merge_requests", self.encoded_project());

        // GitLab splits closed MRs into "closed" (abandoned) and "merged"
        let requests: Vec<ClosedRequest> = self
            .get_all_pages::<MergeRequest>(
                &path,
                &[
                    ("state", "merged"),
                    ("source_branch", source),
                    ("target_branch", target),
                ],
            )
            .await?
            .into_iter()
            .map(Into::into)
            .collect();

        debug!(source, count = requests.len(), "listed merged MRs");
        Ok(requests)
    }

    async fn delete_branch(&self, name: &str) -> Result<()> {
        debug!(branch = name, "deleting remote branch");
        let url = self.api_url(&format!(
            "/projects/{}/repository/branches/{}",
            self.encoded_project(),
            urlencoding::encode(name)
        ));

        self.client
            .delete(&url)
            .header("PRIVATE-TOKEN", &self.token)
            .send()
            .await?
            .error_for_status()
            .map_err(|e| Error::GitLabApi(e.to_string()))?;

        debug!(branch = name, "deleted remote branch");
        Ok(())
    }

    fn config(&self) -> &PlatformConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    fn service(server: &Server) -> GitLabService {
        let config = PlatformConfig {
            platform: Platform::GitLab,
            owner: "group/sub".to_string(),
            repo: "app".to_string(),
            host: None,
        };
        GitLabService::with_api_base(
            "glpat-test".to_string(),
            config,
            format!("{}/api/v4", server.url()),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_branches_follows_next_page() {
        let mut server = Server::new_async().await;
        let first = server
            .mock("GET", "/api/v4/projects/group%2Fsub%2Fapp/repository/branches")
            .match_query(Matcher::UrlEncoded("page".into(), "1".into()))
            .match_header("private-token", "glpat-test")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "2")
            .with_body(r#"[{"name": "main", "protected": true}]"#)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/api/v4/projects/group%2Fsub%2Fapp/repository/branches")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_header("x-next-page", "")
            .with_body(r#"[{"name": "feature-1", "protected": false}]"#)
            .create_async()
            .await;

        let branches = service(&server).list_branches().await.unwrap();

        first.assert_async().await;
        second.assert_async().await;
        assert_eq!(
            branches,
            vec![
                RemoteBranch::new("main", true),
                RemoteBranch::new("feature-1", false),
            ]
        );
    }

    #[tokio::test]
    async fn test_merged_requests_query_and_mapping() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/api/v4/projects/group%2Fsub%2Fapp/merge_requests")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("state".into(), "merged".into()),
                Matcher::UrlEncoded("source_branch".into(), "feature-1".into()),
                Matcher::UrlEncoded("target_branch".into(), "main".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"iid": 4, "state": "merged", "merged_at": "2024-03-01T08:00:00Z", "updated_at": "2024-03-01T08:00:00Z"},
                    {"iid": 2, "state": "merged", "merged_at": null, "updated_at": "2019-01-01T00:00:00Z"}
                ]"#,
            )
            .create_async()
            .await;

        let requests = service(&server)
            .list_closed_requests("feature-1", "main")
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(ClosedRequest::is_merged));
    }

    #[tokio::test]
    async fn test_api_error_maps_to_gitlab_error() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/api/v4/projects/group%2Fsub%2Fapp/repository/branches")
            .match_query(Matcher::Any)
            .with_status(401)
            .with_body(r#"{"message": "401 Unauthorized"}"#)
            .create_async()
            .await;

        let result = service(&server).list_branches().await;
        assert!(matches!(result, Err(Error::GitLabApi(_))));
    }

    #[tokio::test]
    async fn test_delete_branch_encodes_name() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock(
                "DELETE",
                "/api/v4/projects/group%2Fsub%2Fapp/repository/branches/feat%2Flogin",
            )
            .with_status(204)
            .create_async()
            .await;

        service(&server).delete_branch("feat/login").await.unwrap();
        mock.assert_async().await;
    }

    #[test]
    fn test_closed_without_merge_is_not_merged() {
        let mr = MergeRequest {
            iid: 9,
            state: "closed".to_string(),
            merged_at: None,
            updated_at: Some(Utc::now()),
        };
        assert!(!ClosedRequest::from(mr).is_merged());
    }
}
