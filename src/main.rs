// Entry point of the at-channel moderation notifier.
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Verify the bot token against Slack

use anyhow::Context;
use at_channel_bot::config::DEFAULT_LOG_FILTER;
use at_channel_bot::{BotConfig, NotificationComposer, SlackApiClient};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // RUST_LOG is part of the config, so .env must be loaded before logging starts
    let config = BotConfig::from_env()?;

    // Initialize logging so we can see what's happening
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|e| {
        eprintln!("Invalid RUST_LOG {:?}, falling back to info: {}", config.log_filter, e);
        EnvFilter::new(DEFAULT_LOG_FILTER)
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
    tracing::debug!(?config, "Loaded configuration");

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // The token is handed to the composer here; nothing reads it from the
    // environment afterwards.

    let slack = SlackApiClient::new()
        .context("Failed to create Slack API client")?
        .with_base_url(config.slack_api_base_url.clone());

    let identity = slack
        .auth_test(&config.slack_bot_token)
        .await
        .context("Slack rejected SLACK_BOT_TOKEN")?;

    let composer = NotificationComposer::new(slack, config.composer_config());

    tracing::info!(
        bot_user = %identity.user_id,
        team = %identity.team,
        moderation_channel = %composer.config().moderation_channel,
        "At-channel notifier is ready"
    );

    Ok(())
}
