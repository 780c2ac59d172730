//! Public profile statistics lookup against the GitHub REST API.

pub mod client;
pub mod error;
pub mod models;

pub use client::{GitHubClient, GitHubConfig, ProfileStatsSource};
pub use error::{LookupFailureKind, ProfileError};
