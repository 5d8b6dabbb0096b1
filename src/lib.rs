// At-channel moderation notifier.
//
// **Architecture Overview:**
// - `core/` = Message composition (platform-agnostic)
// - `infra/` = Implementations of core traits (the Slack Web API)
// - `config.rs` = Environment-backed configuration

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with several mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
pub mod core;
#[path = "infra/infra_layer.rs"]
pub mod infra;

pub mod config;

pub use crate::config::{BotConfig, ConfigError};
pub use crate::core::moderation::{
    ActionToken, ActionTokenError, ComposerConfig, MessagePayload, MessageSender, MessageTs,
    ModerationRequest, NotificationComposer, PostedMessage, SendError,
};
pub use crate::infra::slack::SlackApiClient;
