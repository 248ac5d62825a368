//! Configuration management for the challenger
//!
//! Configuration is read once at startup from an optional TOML file, then
//! overridden by environment variables. The account username and API token
//! are required; everything else has a default.

use serde::{Deserialize, Serialize};
use std::io;
use std::path::Path;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::models::Challenge;
use crate::roster::BotCategory;
use crate::utils::retry::RetryStack;

/// Environment variable carrying the Lichess API token
pub const TOKEN_ENV: &str = "LICHESS_API_TOKEN";

/// Environment variable carrying the agent's own Lichess username
pub const USERNAME_ENV: &str = "LICHESS_USERNAME";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Own account and credential
    pub account: AccountConfig,

    /// HTTP client settings
    pub lichess: LichessConfig,

    /// Pacing intervals between outbound calls
    pub pacing: PacingConfig,

    /// Opponent pools and ordering flags
    pub roster: RosterConfig,

    /// Time controls to rotate through
    pub time_controls: Vec<Challenge>,

    /// Retry policies applied to every request
    pub retry: RetryStack,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Own account and credential
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AccountConfig {
    pub username: Option<String>,

    /// Never written back out
    #[serde(skip_serializing)]
    pub token: Option<String>,
}

/// HTTP client settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LichessConfig {
    /// API base URL, without trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// User agent string
    pub user_agent: String,
}

impl Default for LichessConfig {
    fn default() -> Self {
        Self {
            base_url: String::from("https://lichess.org"),
            request_timeout_secs: 30,
            user_agent: format!("lichess-challenger/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Pacing intervals, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacingConfig {
    /// Wait at the start of every cycle (challenge endpoint rate limit)
    pub time_between_challenges_ms: u64,

    /// Wait before probing a candidate (status endpoint rate limit)
    pub time_between_find_user_requests_ms: u64,

    /// Wait after a challenge attempt, giving the opponent time to accept
    pub challenge_settle_ms: u64,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            time_between_challenges_ms: 30_000,
            time_between_find_user_requests_ms: 1_500,
            challenge_settle_ms: 5_000,
        }
    }
}

impl PacingConfig {
    #[must_use]
    pub fn time_between_challenges(&self) -> Duration {
        Duration::from_millis(self.time_between_challenges_ms)
    }

    #[must_use]
    pub fn time_between_find_user_requests(&self) -> Duration {
        Duration::from_millis(self.time_between_find_user_requests_ms)
    }

    #[must_use]
    pub fn challenge_settle(&self) -> Duration {
        Duration::from_millis(self.challenge_settle_ms)
    }
}

/// Opponent pools and ordering flags
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RosterConfig {
    pub weak_bots: Vec<String>,
    pub average_bots: Vec<String>,
    pub strong_bots: Vec<String>,

    pub play_weak_bots: bool,
    pub play_average_bots: bool,
    pub play_strong_bots: bool,

    pub randomize_bot_order: bool,
    pub randomize_time_control_order: bool,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            weak_bots: Vec::new(),
            average_bots: Vec::new(),
            strong_bots: Vec::new(),
            play_weak_bots: false,
            play_average_bots: true,
            play_strong_bots: false,
            randomize_bot_order: false,
            randomize_time_control_order: false,
        }
    }
}

impl RosterConfig {
    /// Configured pool for a category
    pub fn pool(&self, category: BotCategory) -> &[String] {
        match category {
            BotCategory::Weak => &self.weak_bots,
            BotCategory::Average => &self.average_bots,
            BotCategory::Strong => &self.strong_bots,
        }
    }

    /// Whether a category takes part in the rotation
    pub fn is_enabled(&self, category: BotCategory) -> bool {
        match category {
            BotCategory::Weak => self.play_weak_bots,
            BotCategory::Average => self.play_average_bots,
            BotCategory::Strong => self.play_strong_bots,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Log format (text, json)
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: String::from("info"),
            format: String::from("text"),
        }
    }
}

impl Config {
    /// Load the optional file, apply environment overrides, then validate
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env();
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| io::Error::new(e.kind(), format!("{}: {e}", path.display())))?;

        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Invalid TOML: {e}")))
    }

    /// Override fields from environment variables
    pub fn apply_env(&mut self) {
        if let Some(username) = non_empty_env(USERNAME_ENV) {
            self.account.username = Some(username);
        }

        if let Some(token) = non_empty_env(TOKEN_ENV) {
            self.account.token = Some(token);
        }

        if let Some(base_url) = non_empty_env("CHALLENGER_BASE_URL") {
            self.lichess.base_url = base_url;
        }

        if let Some(level) = non_empty_env("CHALLENGER_LOG_LEVEL") {
            self.logging.level = level;
        }

        if let Some(format) = non_empty_env("CHALLENGER_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.username().is_none() {
            return Err(Error::config(format!(
                "Missing essential config: {USERNAME_ENV}"
            )));
        }

        if self.token().is_none() {
            return Err(Error::config(format!("Missing essential config: {TOKEN_ENV}")));
        }

        if self.lichess.request_timeout_secs == 0 {
            return Err(Error::config("request_timeout_secs must be greater than 0"));
        }

        if self.pacing.time_between_find_user_requests_ms == 0 {
            return Err(Error::config(
                "time_between_find_user_requests_ms must be greater than 0",
            ));
        }

        if !matches!(self.logging.format.as_str(), "text" | "json") {
            return Err(Error::config(format!(
                "Unknown log format '{}', expected text or json",
                self.logging.format
            )));
        }

        Ok(())
    }

    /// The agent's own username, if set and non-empty
    pub fn username(&self) -> Option<&str> {
        self.account
            .username
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// The API token, if set and non-empty
    pub fn token(&self) -> Option<&str> {
        self.account
            .token
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Get request timeout as Duration
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.lichess.request_timeout_secs)
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
