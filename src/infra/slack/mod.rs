// Slack infra layer.
// - `slack_client.rs` talks to the Slack Web API.

#[path = "slack_client.rs"]
pub mod slack_client;

pub use slack_client::{BotIdentity, SlackApiClient, DEFAULT_SLACK_API_BASE_URL};
