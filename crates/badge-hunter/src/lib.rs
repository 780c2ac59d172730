//! # Badge Hunter
//!
//! Track progress toward GitHub achievement badges and get streamed advice on
//! earning them:
//! - **Badge catalog**: every known badge with its tiers, loaded and validated at startup
//! - **Progress engine**: pure tier resolution for a profile's stars and merged PRs
//! - **Profile lookup**: public stats from the GitHub REST API with typed failures
//! - **Badge Advisor**: Gemini-backed chat, streamed fragment by fragment
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use badge_hunter::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let hunter = BadgeHunter::builder().settings(Settings::load()?).build()?;
//!
//!     let mut profile = ProfileSlot::new();
//!     hunter.refresh(&mut profile, "octocat").await;
//!
//!     for (badge, progress) in hunter.badge_progress(profile.current()) {
//!         if let Some(progress) = progress {
//!             println!("{} {}: {} ({:.0}%)", badge.icon, badge.name, progress.tier_label(), progress.percent_to_next);
//!         }
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **badge-hunter-types**: data model (badges, tiers, stats, progress, transcript)
//! - **badge-hunter-catalog**: embedded catalog, stat-driver table, progress engine
//! - **badge-hunter-github**: profile stats client
//! - **badge-hunter-llm**: streaming chat trait, Gemini client, `BadgeAdvisor`
//!
//! Without an API key (`GEMINI_API_KEY` or `API_KEY`) the advisor is disabled
//! and everything else keeps working.

// Re-export all public APIs
pub use badge_hunter_catalog as catalog;
pub use badge_hunter_github as github;
pub use badge_hunter_llm as llm;
pub use badge_hunter_types as types;

// Re-export commonly used types
pub use badge_hunter_catalog::{Catalog, CategoryFilter, ProgressEngine};
pub use badge_hunter_github::{GitHubClient, LookupFailureKind, ProfileError, ProfileStatsSource};
pub use badge_hunter_llm::{AdviceMode, AdviceOutcome, BadgeAdvisor, ChatClient};
pub use badge_hunter_types::{
    BadgeCategory, BadgeDefinition, ChatMessage, ChatRole, Conversation, MessageHandle, ProfileStats,
    ProgressResult,
};

/// High-level builder and facade
pub mod builder;

pub mod config;
pub mod profile;
pub mod telemetry;

pub use crate::builder::{BadgeHunter, BadgeHunterBuilder};
pub use crate::config::{ConfigurationError, Settings};
pub use crate::profile::ProfileSlot;

/// Convenient prelude with commonly used types
pub mod prelude {
    pub use crate::builder::{BadgeHunter, BadgeHunterBuilder};
    pub use crate::config::Settings;
    pub use crate::profile::ProfileSlot;
    pub use crate::types::{BadgeCategory, BadgeDefinition, Conversation, ProfileStats, ProgressResult};
    pub use crate::llm::{AdviceMode, AdviceOutcome};
    pub use crate::catalog::CategoryFilter;
    pub use anyhow::Result;
}
