// GitHub REST client (HTTP direct, no SDK)

use anyhow::Context;
use async_trait::async_trait;
use badge_hunter_types::ProfileStats;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

use crate::error::{ProfileError, Result};
use crate::models::{GitHubRepo, GitHubUser, SearchCount};

const GITHUB_API_BASE: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github+json";
const MAX_LOGIN_LEN: usize = 39;

/// Source of public profile statistics
#[async_trait]
pub trait ProfileStatsSource: Send + Sync {
    /// Fetch stars and merged PR count for `username`. One attempt, no caching.
    async fn fetch_profile_stats(&self, username: &str) -> Result<ProfileStats>;
}

#[derive(Debug, Clone)]
pub struct GitHubConfig {
    pub base_url: String,
    pub user_agent: String,
    /// Repositories per page when summing stars (GitHub caps this at 100)
    pub per_page: u8,
    pub max_repo_pages: u32,
    pub timeout: Option<Duration>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            base_url: GITHUB_API_BASE.to_string(),
            user_agent: "badge-hunter".to_string(),
            per_page: 100,
            max_repo_pages: 10,
            timeout: None,
        }
    }
}

impl GitHubConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_per_page(mut self, per_page: u8) -> Self {
        self.per_page = per_page.clamp(1, 100);
        self
    }

    pub fn with_max_repo_pages(mut self, pages: u32) -> Self {
        self.max_repo_pages = pages.max(1);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub struct GitHubClient {
    http_client: reqwest::Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> anyhow::Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(GITHUB_ACCEPT));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let mut builder = reqwest::Client::builder().default_headers(headers);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            config: GitHubConfig {
                base_url: config.base_url.trim_end_matches('/').to_string(),
                ..config
            },
        })
    }

    pub fn config(&self) -> &GitHubConfig {
        &self.config
    }

    async fn fetch_user(&self, username: &str) -> Result<GitHubUser> {
        let url = format!("{}/users/{}", self.config.base_url, username);
        self.get_json(username, &url, &[]).await
    }

    /// Sum of star counts across the user's owned repositories
    async fn fetch_total_stars(&self, username: &str) -> Result<u64> {
        let url = format!("{}/users/{}/repos", self.config.base_url, username);
        let per_page = self.config.per_page.to_string();
        let mut total: u64 = 0;

        for page in 1..=self.config.max_repo_pages {
            let page_param = page.to_string();
            let repos: Vec<GitHubRepo> = self
                .get_json(
                    username,
                    &url,
                    &[
                        ("type", "owner"),
                        ("per_page", per_page.as_str()),
                        ("page", page_param.as_str()),
                    ],
                )
                .await?;

            total = repos
                .iter()
                .fold(total, |acc, repo| acc.saturating_add(repo.stargazers_count));

            if repos.len() < self.config.per_page as usize {
                return Ok(total);
            }
        }

        tracing::warn!(
            username,
            pages = self.config.max_repo_pages,
            "Repository listing truncated; star total may be low"
        );
        Ok(total)
    }

    async fn fetch_merged_prs(&self, username: &str) -> Result<u64> {
        let url = format!("{}/search/issues", self.config.base_url);
        let query = format!("author:{} type:pr is:merged", username);
        let count: SearchCount = self
            .get_json(username, &url, &[("q", query.as_str()), ("per_page", "1")])
            .await?;

        if count.incomplete_results {
            tracing::debug!(username, "Merged PR search returned incomplete results");
        }
        Ok(count.total_count)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        username: &str,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(ProfileError::Network)?;

        let response = check_status(username, response).await?;
        let status = response.status().as_u16();

        response.json::<T>().await.map_err(|e| {
            if e.is_decode() {
                ProfileError::Unavailable {
                    status: Some(status),
                    message: format!("Invalid response body: {}", e),
                }
            } else {
                ProfileError::Network(e)
            }
        })
    }
}

/// Map non-success responses onto lookup failure kinds
async fn check_status(username: &str, response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(ProfileError::NotFound(username.to_string()));
    }

    let quota_exhausted = response
        .headers()
        .get("x-ratelimit-remaining")
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim() == "0")
        .unwrap_or(false);

    if status == StatusCode::TOO_MANY_REQUESTS || (status == StatusCode::FORBIDDEN && quota_exhausted)
    {
        return Err(ProfileError::RateLimited);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ProfileError::Unavailable {
        status: Some(status.as_u16()),
        message,
    })
}

/// GitHub logins are ASCII alphanumerics and hyphens, not starting with a hyphen
fn is_plausible_login(username: &str) -> bool {
    !username.is_empty()
        && username.len() <= MAX_LOGIN_LEN
        && !username.starts_with('-')
        && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait]
impl ProfileStatsSource for GitHubClient {
    async fn fetch_profile_stats(&self, username: &str) -> Result<ProfileStats> {
        if !is_plausible_login(username) {
            tracing::debug!(username, "Rejected username that cannot be a GitHub login");
            return Err(ProfileError::NotFound(username.to_string()));
        }

        tracing::debug!(username, "Fetching profile stats");

        let result = async {
            let user = self.fetch_user(username).await?;
            let total_stars = self.fetch_total_stars(&user.login).await?;
            let merged_prs = self.fetch_merged_prs(&user.login).await?;
            // Stats echo the queried name; follow-up requests use the canonical login
            Ok::<_, ProfileError>(ProfileStats::new(
                username,
                user.avatar_url,
                total_stars,
                merged_prs,
            ))
        }
        .await;

        match &result {
            Ok(stats) => tracing::info!(
                username = %stats.username,
                total_stars = stats.total_stars,
                merged_prs = stats.merged_prs,
                "Profile stats fetched"
            ),
            Err(e) => tracing::warn!(username, error = %e, "Profile lookup failed"),
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plausible_login() {
        assert!(is_plausible_login("octocat"));
        assert!(is_plausible_login("mona-lisa-1"));
        assert!(!is_plausible_login(""));
        assert!(!is_plausible_login("-leading"));
        assert!(!is_plausible_login("has space"));
        assert!(!is_plausible_login("../etc/passwd"));
        assert!(!is_plausible_login(&"a".repeat(40)));
    }

    #[test]
    fn test_config_builder_clamps() {
        let config = GitHubConfig::new().with_per_page(0).with_max_repo_pages(0);
        assert_eq!(config.per_page, 1);
        assert_eq!(config.max_repo_pages, 1);

        let config = GitHubConfig::new().with_per_page(250);
        assert_eq!(config.per_page, 100);
    }

    #[test]
    fn test_client_trims_base_url() {
        let client = GitHubClient::new(GitHubConfig::new().with_base_url("http://localhost:1234/"))
            .unwrap();
        assert_eq!(client.config().base_url, "http://localhost:1234");
    }
}
