// GitHub REST API response shapes (only the fields we read)

use serde::Deserialize;

/// `GET /users/{username}`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubUser {
    pub login: String,
    pub avatar_url: String,
}

/// Item of `GET /users/{username}/repos`
#[derive(Debug, Clone, Deserialize)]
pub struct GitHubRepo {
    #[serde(default)]
    pub stargazers_count: u64,
}

/// `GET /search/issues`
#[derive(Debug, Clone, Deserialize)]
pub struct SearchCount {
    pub total_count: u64,
    #[serde(default)]
    pub incomplete_results: bool,
}
