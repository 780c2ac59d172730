use std::path::Path;
use std::time::Duration;

use config::{Config as ConfigLoader, Environment, File, FileFormat};
use serde::Deserialize;
use thiserror::Error;

use badge_hunter_github::GitHubConfig;
use badge_hunter_llm::AdviceModels;

/// Environment variables checked, in order, for the advisor credential
pub const API_KEY_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error("Advisor API key is missing (set GEMINI_API_KEY or API_KEY); chat is disabled")]
    MissingApiKey,

    #[error("Invalid configuration: {0}")]
    Invalid(#[from] config::ConfigError),
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub github: GitHubSettings,
    #[serde(default)]
    pub advisor: AdvisorSettings,
    #[serde(default)]
    pub logging: LoggingSettings,

    // Secret (from ENV only)
    #[serde(skip)]
    pub api_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GitHubSettings {
    pub base_url: String,
    pub user_agent: String,
    pub per_page: u8,
    pub max_repo_pages: u32,
    pub timeout_ms: Option<u64>,
}

impl Default for GitHubSettings {
    fn default() -> Self {
        let defaults = GitHubConfig::default();
        Self {
            base_url: defaults.base_url,
            user_agent: defaults.user_agent,
            per_page: defaults.per_page,
            max_repo_pages: defaults.max_repo_pages,
            timeout_ms: None,
        }
    }
}

impl From<&GitHubSettings> for GitHubConfig {
    fn from(settings: &GitHubSettings) -> Self {
        let config = GitHubConfig::new()
            .with_base_url(&settings.base_url)
            .with_user_agent(&settings.user_agent)
            .with_per_page(settings.per_page)
            .with_max_repo_pages(settings.max_repo_pages);

        match settings.timeout_ms {
            Some(ms) => config.with_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AdvisorSettings {
    /// Overrides the Gemini endpoint, e.g. for a proxy
    pub base_url: Option<String>,
    #[serde(flatten)]
    pub models: AdviceModels,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    #[default]
    Pretty,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Settings {
    /// Load settings from `.env`, TOML files and environment variables
    ///
    /// Hierarchy (weakest to strongest):
    /// 1. built-in defaults
    /// 2. config/default.toml
    /// 3. config/{ENV}.toml (if ENV is set)
    /// 4. `BADGE_HUNTER__SECTION__KEY` environment variables
    ///
    /// Variables in `.env` are added to the process environment first and
    /// never override ones already set. The API key is read from the
    /// environment only.
    pub fn load() -> Result<Self, ConfigurationError> {
        Self::load_from(".")
    }

    /// Same as [`Settings::load`], resolving `.env` and `config/` under `root`
    pub fn load_from(root: impl AsRef<Path>) -> Result<Self, ConfigurationError> {
        let root = root.as_ref();
        dotenvy::from_path(root.join(".env")).ok();

        let env = std::env::var("ENV").unwrap_or_else(|_| "dev".to_string());
        let config_dir = root.join("config");

        let config = ConfigLoader::builder()
            .add_source(File::from(config_dir.join("default")).required(false))
            .add_source(File::from(config_dir.join(&env)).required(false))
            .add_source(
                Environment::with_prefix("BADGE_HUNTER")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let mut settings: Settings = config.try_deserialize()?;
        settings.api_key = api_key_from_env();

        Ok(settings)
    }

    /// Parse settings from TOML text (useful for testing)
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigurationError> {
        let config = ConfigLoader::builder()
            .add_source(File::from_str(source, FileFormat::Toml))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn require_api_key(&self) -> Result<&str, ConfigurationError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigurationError::MissingApiKey)
    }
}

fn api_key_from_env() -> Option<String> {
    API_KEY_VARS
        .iter()
        .filter_map(|name| std::env::var(name).ok())
        .find(|value| !value.trim().is_empty())
}
