// Moderation domain models - the request and the Slack message it becomes.
//
// Blocks serialize straight to Block Kit JSON, so the infra layer can post a
// payload without translating it again.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// An at-channel request as received from a user. Not persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModerationRequest {
    /// Message the user wants posted
    pub text: String,
    /// Channel the message should go to (not the moderation channel)
    pub channel_id: String,
    /// Requesting user
    pub user_id: String,
    /// Opaque id used to find this request again when a moderator decides
    pub correlation_hash: String,
}

/// Text object inside a block or button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TextObject {
    Mrkdwn { text: String },
    PlainText { text: String },
}

impl TextObject {
    pub fn mrkdwn(text: impl Into<String>) -> Self {
        TextObject::Mrkdwn { text: text.into() }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        TextObject::PlainText { text: text.into() }
    }

    pub fn text(&self) -> &str {
        match self {
            TextObject::Mrkdwn { text } | TextObject::PlainText { text } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ButtonStyle {
    Primary,
    Danger,
}

/// Interactive button. `action_id` is echoed back by Slack on click.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename = "button")]
pub struct Button {
    pub text: TextObject,
    pub action_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<ButtonStyle>,
}

/// One display block of a message, in Block Kit layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Section { text: TextObject },
    Divider,
    Actions { elements: Vec<Button> },
}

impl Block {
    /// Markdown section block.
    pub fn section(text: impl Into<String>) -> Self {
        Block::Section {
            text: TextObject::mrkdwn(text),
        }
    }

    /// Markdown section that renders `text` as a block quote.
    pub fn quote(text: &str) -> Self {
        Block::section(format!(">>>{}", text))
    }

    /// Text of a section block, `None` for dividers and actions.
    pub fn section_text(&self) -> Option<&str> {
        match self {
            Block::Section { text } => Some(text.text()),
            _ => None,
        }
    }
}

/// A fully addressed message, ready to hand to a `MessageSender`.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct MessagePayload {
    /// Channel id, channel name or user id (for a direct notice)
    pub channel: String,
    /// Fallback text shown in notifications
    pub text: String,
    pub blocks: Vec<Block>,
    /// Bot credential. Sent as a header, never in the body.
    #[serde(skip)]
    pub token: String,
}

impl MessagePayload {
    /// All buttons of all action blocks, in display order.
    pub fn buttons(&self) -> impl Iterator<Item = &Button> {
        self.blocks.iter().flat_map(|block| match block {
            Block::Actions { elements } => elements.as_slice(),
            _ => &[][..],
        })
    }
}

impl fmt::Debug for MessagePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessagePayload")
            .field("channel", &self.channel)
            .field("text", &self.text)
            .field("blocks", &self.blocks)
            .field("token", &"<redacted>")
            .finish()
    }
}

/// Slack message timestamp, e.g. `"1610000000.000100"`.
///
/// Slack uses it as the message id within a channel, so it is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct MessageTs(String);

impl MessageTs {
    pub fn new(ts: impl Into<String>) -> Self {
        Self(ts.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Wall-clock time of the message, if the ts has the usual `secs.micros` shape.
    ///
    /// The fraction is read as a decimal fraction of a second, at most six digits.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        let (secs, fraction) = self.0.split_once('.').unwrap_or((self.0.as_str(), ""));
        if fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }

        let secs: i64 = secs.parse().ok()?;
        let micros: u32 = format!("{:0<6}", fraction).parse().ok()?;
        DateTime::<Utc>::from_timestamp(secs, micros * 1_000)
    }
}

impl fmt::Display for MessageTs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the platform reports back after a successful post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostedMessage {
    /// Resolved channel id (Slack returns the id even when posting by name)
    pub channel: String,
    pub ts: MessageTs,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_blocks_serialize_as_block_kit() {
        let blocks = vec![
            Block::quote("hi"),
            Block::Divider,
            Block::Actions {
                elements: vec![Button {
                    text: TextObject::plain("Reject"),
                    action_id: "reject:h".to_string(),
                    style: Some(ButtonStyle::Danger),
                }],
            },
        ];

        assert_eq!(
            serde_json::to_value(&blocks).unwrap(),
            json!([
                { "type": "section", "text": { "type": "mrkdwn", "text": ">>>hi" } },
                { "type": "divider" },
                { "type": "actions", "elements": [{
                    "type": "button",
                    "text": { "type": "plain_text", "text": "Reject" },
                    "action_id": "reject:h",
                    "style": "danger"
                }]}
            ])
        );
    }

    #[test]
    fn test_button_without_style_omits_field() {
        let button = Button {
            text: TextObject::plain("Approve without @channel"),
            action_id: "approve-no-broadcast:h".to_string(),
            style: None,
        };

        let value = serde_json::to_value(&button).unwrap();
        assert!(value.get("style").is_none());
    }

    #[test]
    fn test_payload_never_leaks_token() {
        let payload = MessagePayload {
            channel: "C123".to_string(),
            text: "hello".to_string(),
            blocks: vec![],
            token: "xoxb-secret".to_string(),
        };

        let body = serde_json::to_string(&payload).unwrap();
        assert!(!body.contains("xoxb-secret"));
        assert!(!format!("{:?}", payload).contains("xoxb-secret"));
    }

    #[test]
    fn test_ts_to_datetime() {
        let ts = MessageTs::new("1610000000.000100");
        let dt = ts.to_datetime().unwrap();

        assert_eq!(dt.timestamp(), 1_610_000_000);
        assert_eq!(dt.timestamp_subsec_micros(), 100);
        assert_eq!(ts.to_string(), "1610000000.000100");
    }

    #[test]
    fn test_ts_short_fraction_is_padded() {
        let dt = MessageTs::new("1610000000.5").to_datetime().unwrap();
        assert_eq!(dt.timestamp_subsec_micros(), 500_000);

        let dt = MessageTs::new("1610000000").to_datetime().unwrap();
        assert_eq!(dt.timestamp(), 1_610_000_000);
        assert_eq!(dt.timestamp_subsec_micros(), 0);
    }

    #[test]
    fn test_ts_to_datetime_rejects_garbage() {
        assert!(MessageTs::new("not-a-ts").to_datetime().is_none());
        assert!(MessageTs::new("1610000000.0001000").to_datetime().is_none());
        assert!(MessageTs::new("1610000000.-5").to_datetime().is_none());
    }
}
