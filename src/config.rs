// Process configuration, read once at startup.
//
// Values come from the environment; `main` loads a `.env` file first if one exists.

use crate::core::moderation::{ComposerConfig, DEFAULT_MODERATION_CHANNEL};
use crate::infra::slack::DEFAULT_SLACK_API_BASE_URL;
use thiserror::Error;

pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing {0} environment variable! Create a .env file with your bot token.")]
    Missing(&'static str),
}

#[derive(Clone)]
pub struct BotConfig {
    pub slack_bot_token: String,
    pub moderation_channel: String,
    pub slack_api_base_url: String,
    /// `tracing-subscriber` filter directive, from `RUST_LOG`
    pub log_filter: String,
}

impl BotConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build the config from any variable source (the environment, or a map in tests).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Blank values count as unset
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let slack_bot_token =
            get("SLACK_BOT_TOKEN").ok_or(ConfigError::Missing("SLACK_BOT_TOKEN"))?;
        let moderation_channel =
            get("MODERATION_CHANNEL").unwrap_or_else(|| DEFAULT_MODERATION_CHANNEL.to_string());
        let slack_api_base_url =
            get("SLACK_API_BASE_URL").unwrap_or_else(|| DEFAULT_SLACK_API_BASE_URL.to_string());
        let log_filter = get("RUST_LOG").unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            slack_bot_token,
            moderation_channel,
            slack_api_base_url,
            log_filter,
        })
    }

    pub fn composer_config(&self) -> ComposerConfig {
        ComposerConfig {
            bot_token: self.slack_bot_token.clone(),
            moderation_channel: self.moderation_channel.clone(),
        }
    }
}

impl std::fmt::Debug for BotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BotConfig")
            .field("slack_bot_token", &"<redacted>")
            .field("moderation_channel", &self.moderation_channel)
            .field("slack_api_base_url", &self.slack_api_base_url)
            .field("log_filter", &self.log_filter)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = BotConfig::from_lookup(lookup(&[("SLACK_BOT_TOKEN", "xoxb-1")])).unwrap();

        assert_eq!(config.slack_bot_token, "xoxb-1");
        assert_eq!(config.moderation_channel, "at-channel-requests");
        assert_eq!(config.slack_api_base_url, "https://slack.com/api");
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn test_overrides() {
        let config = BotConfig::from_lookup(lookup(&[
            ("SLACK_BOT_TOKEN", "xoxb-1"),
            ("MODERATION_CHANNEL", "C0MODS"),
            ("SLACK_API_BASE_URL", "http://localhost:9999/api"),
            ("RUST_LOG", "at_channel_bot=debug"),
        ]))
        .unwrap();

        assert_eq!(config.log_filter, "at_channel_bot=debug");

        assert_eq!(config.composer_config().moderation_channel, "C0MODS");
        assert_eq!(config.slack_api_base_url, "http://localhost:9999/api");
    }

    #[test]
    fn test_missing_or_blank_token() {
        assert_eq!(
            BotConfig::from_lookup(lookup(&[])).unwrap_err(),
            ConfigError::Missing("SLACK_BOT_TOKEN")
        );
        assert_eq!(
            BotConfig::from_lookup(lookup(&[("SLACK_BOT_TOKEN", "  ")])).unwrap_err(),
            ConfigError::Missing("SLACK_BOT_TOKEN")
        );
    }
}
