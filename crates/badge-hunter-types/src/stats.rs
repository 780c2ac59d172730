use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Public profile statistics from a successful lookup.
///
/// Created fresh on every lookup and superseded, never merged, by the next one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileStats {
    pub username: String,
    pub avatar_url: String,
    pub total_stars: u64,
    pub merged_prs: u64,
    pub fetched_at: DateTime<Utc>,
}

impl ProfileStats {
    pub fn new(
        username: impl Into<String>,
        avatar_url: impl Into<String>,
        total_stars: u64,
        merged_prs: u64,
    ) -> Self {
        Self {
            username: username.into(),
            avatar_url: avatar_url.into(),
            total_stars,
            merged_prs,
            fetched_at: Utc::now(),
        }
    }

    pub fn stat(&self, kind: StatKind) -> u64 {
        kind.read(self)
    }
}

/// Which profile statistic drives a tiered badge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatKind {
    TotalStars,
    MergedPullRequests,
}

impl StatKind {
    pub fn read(&self, stats: &ProfileStats) -> u64 {
        match self {
            Self::TotalStars => stats.total_stars,
            Self::MergedPullRequests => stats.merged_prs,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TotalStars => "total_stars",
            Self::MergedPullRequests => "merged_pull_requests",
        }
    }
}
