//! High-level builder wiring the catalog, profile lookup and advisor together

use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};

use crate::config::Settings;
use crate::profile::ProfileSlot;
use badge_hunter_catalog::{Catalog, ProgressEngine};
use badge_hunter_github::{GitHubClient, GitHubConfig, ProfileError, ProfileStatsSource};
use badge_hunter_llm::{AdviceMode, AdviceOutcome, BadgeAdvisor, ChatClient, ClientFactory, ProviderConfig};
use badge_hunter_types::{BadgeDefinition, Conversation, MessageHandle, ProfileStats, ProgressResult};

/// Builder for [`BadgeHunter`]
///
/// # Example
///
/// ```rust,no_run
/// use badge_hunter::prelude::*;
///
/// # fn main() -> Result<()> {
/// let hunter = BadgeHunterBuilder::new()
///     .settings(Settings::load()?)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Default)]
pub struct BadgeHunterBuilder {
    settings: Settings,
    catalog: Option<Catalog>,
    stats_source: Option<Arc<dyn ProfileStatsSource>>,
    chat_client: Option<Arc<dyn ChatClient>>,
}

impl BadgeHunterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = settings;
        self
    }

    /// Set the advisor API key, overriding anything read from the environment
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.settings.api_key = Some(key.into());
        self
    }

    /// Use a custom catalog instead of the built-in one
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Use a custom profile source instead of the GitHub client
    pub fn stats_source(mut self, source: Arc<dyn ProfileStatsSource>) -> Self {
        self.stats_source = Some(source);
        self
    }

    /// Use a custom chat client instead of Gemini. Enables chat without an API key.
    pub fn chat_client(mut self, client: Arc<dyn ChatClient>) -> Self {
        self.chat_client = Some(client);
        self
    }

    /// Build the hunter
    ///
    /// A missing API key is not an error: it is logged once and the advisor
    /// stays disabled while catalog and lookups keep working.
    pub fn build(self) -> Result<BadgeHunter> {
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => Catalog::builtin().context("Built-in badge catalog is invalid")?,
        };

        let stats_source = match self.stats_source {
            Some(source) => source,
            None => {
                let config = GitHubConfig::from(&self.settings.github);
                Arc::new(GitHubClient::new(config).context("Failed to create GitHub client")?)
            }
        };

        let chat_client = match self.chat_client {
            Some(client) => Some(client),
            None => match self.settings.require_api_key() {
                Ok(key) => {
                    let mut provider = ProviderConfig::gemini(key);
                    if let Some(base_url) = &self.settings.advisor.base_url {
                        provider = provider.with_base_url(base_url);
                    }
                    Some(ClientFactory::create_chat_client(provider).context("Failed to create chat client")?)
                }
                Err(e) => {
                    tracing::error!(error = %e, "Badge Advisor disabled");
                    None
                }
            },
        };

        let advisor = chat_client
            .map(|client| BadgeAdvisor::with_models(client, self.settings.advisor.models.clone()));

        tracing::info!(
            badges = catalog.len(),
            chat_enabled = advisor.is_some(),
            "Badge Hunter ready"
        );

        Ok(BadgeHunter {
            engine: ProgressEngine::from_catalog(&catalog),
            catalog,
            stats_source,
            advisor,
        })
    }
}

/// Catalog, progress engine, profile lookup and (optionally) the advisor.
///
/// Holds no per-session state: the displayed profile lives in a
/// [`ProfileSlot`] and the transcript in a [`Conversation`], both owned by the caller.
pub struct BadgeHunter {
    catalog: Catalog,
    engine: ProgressEngine,
    stats_source: Arc<dyn ProfileStatsSource>,
    advisor: Option<BadgeAdvisor>,
}

impl BadgeHunter {
    pub fn builder() -> BadgeHunterBuilder {
        BadgeHunterBuilder::new()
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn engine(&self) -> &ProgressEngine {
        &self.engine
    }

    pub fn advisor(&self) -> Option<&BadgeAdvisor> {
        self.advisor.as_ref()
    }

    pub fn chat_enabled(&self) -> bool {
        self.advisor.is_some()
    }

    /// Look up a profile; surrounding whitespace is ignored
    pub async fn lookup(&self, username: &str) -> Result<ProfileStats, ProfileError> {
        let username = username.trim();
        let result = self.stats_source.fetch_profile_stats(username).await;

        if let Err(e) = &result {
            tracing::warn!(username, kind = ?e.kind(), error = %e, "Profile lookup failed");
        }

        result
    }

    /// Look up a profile and record the outcome in `slot`
    pub async fn refresh(&self, slot: &mut ProfileSlot, username: &str) -> bool {
        slot.apply(self.lookup(username).await)
    }

    pub fn progress(&self, badge_id: &str, stats: Option<&ProfileStats>) -> Option<ProgressResult> {
        let badge = self.catalog.get(badge_id)?;
        self.engine.compute_progress(badge, stats)
    }

    /// Every catalog badge with its progress for `stats`, in catalog order
    pub fn badge_progress(&self, stats: Option<&ProfileStats>) -> Vec<(&BadgeDefinition, Option<ProgressResult>)> {
        self.engine.progress_for_all(&self.catalog, stats)
    }

    /// Ask the advisor, streaming the reply into `conversation`.
    ///
    /// Returns `None` when chat is disabled or the prompt is blank; the
    /// transcript is left untouched in both cases.
    pub async fn ask(
        &self,
        conversation: &Mutex<Conversation>,
        prompt: &str,
        mode: AdviceMode,
    ) -> Option<(MessageHandle, AdviceOutcome)> {
        let Some(advisor) = &self.advisor else {
            tracing::debug!("Ignoring advisor question: chat is disabled");
            return None;
        };

        advisor.ask(conversation, prompt, mode).await
    }
}
