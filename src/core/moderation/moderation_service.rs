// Notification composer - core logic for the at-channel moderation messages.
//
// This service builds:
// - The approval request posted to the moderation channel
// - The approved message posted back to the requested channel
// - The rejection notice sent to the requester
//
// NO HTTP here - sending goes through the `MessageSender` port.

use super::action_token::ActionToken;
use super::moderation_models::{
    Block, Button, ButtonStyle, MessagePayload, MessageTs, ModerationRequest, PostedMessage,
    TextObject,
};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Channel new requests are posted to unless configured otherwise.
pub const DEFAULT_MODERATION_CHANNEL: &str = "at-channel-requests";

const BROADCAST_MARKER: &str = "<!channel>";
const NO_BROADCAST_PHRASE: &str = "the channel";

// ============================================================================
// ERRORS
// ============================================================================

/// Any failure of the outbound send.
#[derive(Debug, Error)]
pub enum SendError {
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Slack returned HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Slack API error: {0}")]
    Api(String),

    #[error("Malformed Slack response: {0}")]
    MalformedResponse(String),
}

// ============================================================================
// SENDER TRAIT (PORT)
// ============================================================================

/// The platform's message-delivery operation.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver one message and report where and when it landed.
    async fn post_message(&self, payload: &MessagePayload) -> Result<PostedMessage, SendError>;
}

// Lets the composer hold a trait object picked at runtime.
#[async_trait]
impl MessageSender for Box<dyn MessageSender> {
    async fn post_message(&self, payload: &MessagePayload) -> Result<PostedMessage, SendError> {
        (**self).post_message(payload).await
    }
}

#[async_trait]
impl<S: MessageSender + ?Sized> MessageSender for Arc<S> {
    async fn post_message(&self, payload: &MessagePayload) -> Result<PostedMessage, SendError> {
        (**self).post_message(payload).await
    }
}

// ============================================================================
// CORE SERVICE
// ============================================================================

/// Settings the composer needs for every message.
#[derive(Clone)]
pub struct ComposerConfig {
    /// Bot token attached to every payload
    pub bot_token: String,
    /// Where approval requests go
    pub moderation_channel: String,
}

impl ComposerConfig {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            moderation_channel: DEFAULT_MODERATION_CHANNEL.to_string(),
        }
    }
}

impl std::fmt::Debug for ComposerConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComposerConfig")
            .field("bot_token", &"<redacted>")
            .field("moderation_channel", &self.moderation_channel)
            .finish()
    }
}

/// Builds the moderation messages and hands them to a sender.
pub struct NotificationComposer<S: MessageSender> {
    sender: S,
    config: ComposerConfig,
}

impl<S: MessageSender> NotificationComposer<S> {
    /// Create a new composer with the given sender and config.
    pub fn new(sender: S, config: ComposerConfig) -> Self {
        Self { sender, config }
    }

    pub fn config(&self) -> &ComposerConfig {
        &self.config
    }

    /// Post a new request to the moderation channel.
    ///
    /// # Arguments
    /// * `text` - The message the user wants posted
    /// * `channel_id` - Channel the message was requested for
    /// * `user_id` - The requesting user
    /// * `hash` - Correlation hash, embedded unmodified in each button's action id
    ///
    /// # Returns
    /// The timestamp of the moderation message, as reported by the sender.
    pub async fn request_approval(
        &self,
        text: &str,
        channel_id: &str,
        user_id: &str,
        hash: &str,
    ) -> Result<MessageTs, SendError> {
        let payload = self.build_approval_request(text, channel_id, user_id, hash);

        match self.sender.post_message(&payload).await {
            Ok(posted) => {
                let posted_at = posted_at(&posted.ts);
                tracing::info!(
                    channel = %posted.channel,
                    requester = user_id,
                    hash,
                    ts = %posted.ts,
                    posted_at = %posted_at,
                    "Posted at-channel request for moderation"
                );
                Ok(posted.ts)
            }
            Err(err) => {
                tracing::warn!(
                    channel = %payload.channel,
                    requester = user_id,
                    hash,
                    error = %err,
                    "Failed to post at-channel request"
                );
                Err(err)
            }
        }
    }

    /// Same as `request_approval`, taking the request as one value.
    pub async fn request_approval_for(
        &self,
        request: &ModerationRequest,
    ) -> Result<MessageTs, SendError> {
        self.request_approval(
            &request.text,
            &request.channel_id,
            &request.user_id,
            &request.correlation_hash,
        )
        .await
    }

    /// Post an approved message to the channel it was requested for.
    ///
    /// With `broadcast` the text carries an @channel mention, otherwise it just
    /// says "the channel".
    pub async fn notify_channel(
        &self,
        channel_id: &str,
        text: &str,
        user_id: &str,
        broadcast: bool,
    ) -> Result<(), SendError> {
        let payload = self.build_channel_notice(channel_id, text, user_id, broadcast);
        self.send_notice(&payload, "approved message").await
    }

    /// Tell the requester their message was rejected, and by whom.
    ///
    /// The notice goes to `user_id` directly; `channel_id` is only logged.
    pub async fn notify_rejection(
        &self,
        channel_id: &str,
        user_id: &str,
        text: &str,
        rejecter_id: &str,
    ) -> Result<(), SendError> {
        tracing::debug!(
            requested_channel = channel_id,
            requester = user_id,
            rejecter = rejecter_id,
            "Sending rejection notice"
        );
        let payload = self.build_rejection_notice(user_id, text, rejecter_id);
        self.send_notice(&payload, "rejection notice").await
    }

    async fn send_notice(&self, payload: &MessagePayload, kind: &str) -> Result<(), SendError> {
        match self.sender.post_message(payload).await {
            Ok(posted) => {
                let posted_at = posted_at(&posted.ts);
                tracing::info!(
                    channel = %posted.channel,
                    ts = %posted.ts,
                    posted_at = %posted_at,
                    "Sent {}",
                    kind
                );
                Ok(())
            }
            Err(err) => {
                tracing::warn!(channel = %payload.channel, error = %err, "Failed to send {}", kind);
                Err(err)
            }
        }
    }

    // ------------------------------------------------------------------------
    // Payload builders
    // ------------------------------------------------------------------------

    /// Payload for `request_approval`.
    pub fn build_approval_request(
        &self,
        text: &str,
        channel_id: &str,
        user_id: &str,
        hash: &str,
    ) -> MessagePayload {
        let [approve, approve_no_broadcast, reject] = ActionToken::decisions_for(hash);

        MessagePayload {
            channel: self.config.moderation_channel.clone(),
            text: "There's a new at-channel request!".to_string(),
            blocks: vec![
                Block::section(format!(
                    ":wave: Hello, kind moderators!\n\n<@{}> has requested to use at-channel in <#{}>. The message is:",
                    user_id, channel_id
                )),
                Block::quote(text),
                Block::Divider,
                Block::section("Do you want to *approve* or *reject* this message?"),
                Block::Actions {
                    elements: vec![
                        Button {
                            text: TextObject::plain("Approve"),
                            action_id: approve.to_string(),
                            style: Some(ButtonStyle::Primary),
                        },
                        Button {
                            text: TextObject::plain("Approve without @channel"),
                            action_id: approve_no_broadcast.to_string(),
                            style: None,
                        },
                        Button {
                            text: TextObject::plain("Reject"),
                            action_id: reject.to_string(),
                            style: Some(ButtonStyle::Danger),
                        },
                    ],
                },
            ],
            token: self.config.bot_token.clone(),
        }
    }

    /// Payload for `notify_channel`.
    pub fn build_channel_notice(
        &self,
        channel_id: &str,
        text: &str,
        user_id: &str,
        broadcast: bool,
    ) -> MessagePayload {
        let audience = if broadcast {
            BROADCAST_MARKER
        } else {
            NO_BROADCAST_PHRASE
        };

        MessagePayload {
            channel: channel_id.to_string(),
            text: format!("<@{}> has sent a message to the channel.", user_id),
            blocks: vec![Block::section(format!(
                "<@{}> has sent the following message to {}:\n\n{}",
                user_id, audience, text
            ))],
            token: self.config.bot_token.clone(),
        }
    }

    /// Payload for `notify_rejection`, addressed to the requester.
    pub fn build_rejection_notice(
        &self,
        user_id: &str,
        text: &str,
        rejecter_id: &str,
    ) -> MessagePayload {
        MessagePayload {
            channel: user_id.to_string(),
            text: format!(
                "Your at-channel request has been rejected by <@{}>",
                rejecter_id
            ),
            blocks: vec![
                Block::section(":face_with_hand_over_mouth: Your message:"),
                Block::quote(text),
                Block::section(format!("has been rejected by <@{}>.", rejecter_id)),
            ],
            token: self.config.bot_token.clone(),
        }
    }
}

/// Human-readable time of a posted message for the logs.
fn posted_at(ts: &MessageTs) -> String {
    ts.to_datetime()
        .map(|dt| dt.to_rfc3339())
        .unwrap_or_else(|| "unknown".to_string())
}

// ============================================================================
// TESTS
// ============================================================================
